//! Regras padrão de mascaramento (LGPD).
//!
//! Conjunto registrado na inicialização quando
//! `masking.include_builtin_rules = true`:
//! - Documentos: CPF, RG, CNPJ, CNS (cartão do SUS)
//! - Contato: telefone, e-mail, endereço
//! - Saúde: diagnóstico, prontuário, prescrições, alergias
//! - Financeiro: cartão, conta bancária, PIX
//! - Biometria e credenciais

use crate::types::context::View;
use crate::types::rules::{DataCategory, MaskingRule, MaskingType, PartialPattern, RuleConditions};

/// Retorna as regras padrão (o registro ordena por prioridade).
pub fn builtin_rules() -> Vec<MaskingRule> {
    vec![
        // ═══════════════════════════════════════════════════════════════
        // Credenciais e biometria: nunca saem
        // ═══════════════════════════════════════════════════════════════
        MaskingRule::new(
            "credentials",
            &[
                "password",
                "senha",
                "client_secret",
                "api_key",
                "access_token",
                "refresh_token",
            ],
            DataCategory::Sensitive,
            MaskingType::Redact,
            1000,
        ),
        MaskingRule::new(
            "biometric-templates",
            &["fingerprint", "biometric", "face_template", "biometria"],
            DataCategory::Biometric,
            MaskingType::Redact,
            900,
        ),
        // ═══════════════════════════════════════════════════════════════
        // Financeiro
        // ═══════════════════════════════════════════════════════════════
        MaskingRule::new(
            "card-number",
            &["card_number", "cardnumber", "numero_cartao", "cvv"],
            DataCategory::Financial,
            MaskingType::Tokenize,
            800,
        ),
        MaskingRule::new(
            "bank-account",
            &["bank_account", "conta_bancaria", "iban", "pix_key", "chave_pix"],
            DataCategory::Financial,
            MaskingType::Partial(PartialPattern::Generic),
            700,
        ),
        // ═══════════════════════════════════════════════════════════════
        // Saúde
        // ═══════════════════════════════════════════════════════════════
        MaskingRule::new(
            "medical-record",
            &[
                "diagnosis",
                "diagnostico",
                "medical_history",
                "prontuario",
                "prescription",
                "allergies",
                "clinical_notes",
            ],
            DataCategory::Medical,
            MaskingType::Redact,
            600,
        ),
        // Profissionais de saúde veem o prontuário na tela de detalhe
        MaskingRule::new(
            "medical-record-staff-list",
            &["diagnosis", "diagnostico", "clinical_notes"],
            DataCategory::Medical,
            MaskingType::Full,
            650,
        )
        .only_in(View::List)
        .with_conditions(RuleConditions {
            roles: vec!["receptionist".to_string(), "assistant".to_string()],
            purposes: Vec::new(),
            consent_given: None,
        }),
        // ═══════════════════════════════════════════════════════════════
        // Documentos
        // ═══════════════════════════════════════════════════════════════
        MaskingRule::new(
            "cpf",
            &["cpf"],
            DataCategory::Sensitive,
            MaskingType::Partial(PartialPattern::Cpf),
            500,
        ),
        MaskingRule::new(
            "cnpj",
            &["cnpj"],
            DataCategory::Personal,
            MaskingType::Partial(PartialPattern::Cnpj),
            480,
        ),
        MaskingRule::new(
            "rg",
            &["=rg", "identity_document"],
            DataCategory::Sensitive,
            MaskingType::Partial(PartialPattern::Generic),
            470,
        ),
        MaskingRule::new(
            "cns",
            &["=cns", "cartao_sus"],
            DataCategory::Medical,
            MaskingType::Hash,
            460,
        ),
        // Exportações levam só o hash do CPF
        MaskingRule::new(
            "cpf-export",
            &["cpf"],
            DataCategory::Sensitive,
            MaskingType::Hash,
            550,
        )
        .only_in(View::Export),
        // ═══════════════════════════════════════════════════════════════
        // Contato
        // ═══════════════════════════════════════════════════════════════
        MaskingRule::new(
            "phone",
            &["phone", "telefone", "celular", "whatsapp"],
            DataCategory::Personal,
            MaskingType::Partial(PartialPattern::Phone),
            300,
        ),
        MaskingRule::new(
            "email",
            &["email"],
            DataCategory::Personal,
            MaskingType::Partial(PartialPattern::Email),
            300,
        ),
        MaskingRule::new(
            "address",
            &["address", "endereco", "street", "logradouro", "=cep", "zip_code"],
            DataCategory::Personal,
            MaskingType::Full,
            200,
        ),
    ]
}
