//! Registros de auditoria do mascaramento.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::context::{MaskingContext, View};
use super::rules::DataCategory;

/// Nível de confidencialidade do payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConfidentialityLevel {
    Public,
    Restricted,
    Confidential,
    HighlyConfidential,
}

impl ConfidentialityLevel {
    /// Nível base de uma categoria.
    pub fn base_for(category: DataCategory) -> Self {
        match category {
            DataCategory::Medical | DataCategory::Biometric => ConfidentialityLevel::Confidential,
            DataCategory::Financial | DataCategory::Sensitive => ConfidentialityLevel::Restricted,
            DataCategory::Personal => ConfidentialityLevel::Public,
        }
    }

    /// Sobe um nível (satura no topo).
    pub fn escalate(self) -> Self {
        match self {
            ConfidentialityLevel::Public => ConfidentialityLevel::Restricted,
            ConfidentialityLevel::Restricted => ConfidentialityLevel::Confidential,
            ConfidentialityLevel::Confidential | ConfidentialityLevel::HighlyConfidential => {
                ConfidentialityLevel::HighlyConfidential
            }
        }
    }

    /// Converte o nome armazenado.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(ConfidentialityLevel::Public),
            "restricted" => Some(ConfidentialityLevel::Restricted),
            "confidential" => Some(ConfidentialityLevel::Confidential),
            "highly_confidential" => Some(ConfidentialityLevel::HighlyConfidential),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfidentialityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidentialityLevel::Public => write!(f, "public"),
            ConfidentialityLevel::Restricted => write!(f, "restricted"),
            ConfidentialityLevel::Confidential => write!(f, "confidential"),
            ConfidentialityLevel::HighlyConfidential => write!(f, "highly_confidential"),
        }
    }
}

/// Campo que foi mascarado.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MaskedField {
    /// Caminho do campo (ex.: `patients[0].cpf`).
    pub path: String,

    /// Regra aplicada.
    pub rule_id: String,

    /// Categoria do dado.
    pub category: DataCategory,

    /// Tipo de mascaramento (ex.: `partial:cpf`).
    pub masking_type: String,
}

/// Campo liberado por acesso de emergência.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExemptedField {
    /// Caminho do campo.
    pub path: String,

    /// Regra que teria sido aplicada.
    pub rule_id: String,
}

/// Registro de auditoria de uma operação de mascaramento.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaskingAudit {
    /// ID único do registro.
    pub id: String,

    /// Usuário que recebeu os dados.
    pub user_id: String,

    /// Papel do usuário.
    pub role: String,

    /// Visão de saída.
    pub view: View,

    /// Se foi acesso de emergência.
    pub emergency_access: bool,

    /// Campos mascarados.
    pub masked_fields: Vec<MaskedField>,

    /// Campos liberados por emergência.
    pub exempted_fields: Vec<ExemptedField>,

    /// Nível de confidencialidade resultante.
    pub confidentiality: ConfidentialityLevel,

    /// Momento do mascaramento.
    pub timestamp: DateTime<Utc>,
}

impl MaskingAudit {
    /// Cria um registro vazio para o contexto.
    pub fn for_context(context: &MaskingContext) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: context.user_id.clone(),
            role: context.role.clone(),
            view: context.view,
            emergency_access: context.is_emergency_access,
            masked_fields: Vec::new(),
            exempted_fields: Vec::new(),
            confidentiality: ConfidentialityLevel::Public,
            timestamp: Utc::now(),
        }
    }

    /// Se alguma regra de fato foi aplicada.
    pub fn any_masked(&self) -> bool {
        !self.masked_fields.is_empty()
    }
}

/// Resultado do mascaramento: dados novos + auditoria.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaskingOutcome {
    /// Payload mascarado.
    pub data: serde_json::Value,

    /// Registro de auditoria.
    pub audit: MaskingAudit,
}
