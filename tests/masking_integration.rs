//! Testes de integração para o motor de mascaramento do Sigilo.

use serde_json::{json, Value};
use sigilo::masking::{MaskingEngine, RuleRegistry, Transformer};
use sigilo::types::config::{Config, MaskingConfig};
use sigilo::types::{
    ConfidentialityLevel, DataCategory, MaskingContext, MaskingRule, MaskingType, PartialPattern,
    View,
};

fn builtin_engine() -> MaskingEngine {
    MaskingEngine::from_config(&MaskingConfig::default()).unwrap()
}

fn patient() -> Value {
    json!({
        "id": 42,
        "name": "Joana Silva",
        "cpf": "123.456.789-00",
        "rg": "12.345.678-9",
        "phone": "+55 11 98765-4321",
        "email": "joana.silva@clinica.com.br",
        "address": {"street": "Rua das Flores, 10", "cep": "01234-567", "city": "São Paulo"},
        "organization": "Clínica Bella",
        "medical_history": [{"date": "2024-01-10", "note": "peeling químico"}],
        "diagnosis": "melasma",
        "card_number": "4111111111111111",
        "password": "hunter2"
    })
}

// Cenários de ponta a ponta com as regras padrão
mod builtin_rules_tests {
    use super::*;

    #[test]
    fn test_receptionist_detail_view() {
        let engine = builtin_engine();
        let ctx = MaskingContext::new("u1", "receptionist", View::Detail);

        let outcome = engine.mask(&patient(), &ctx).unwrap();
        let data = &outcome.data;

        assert_eq!(data["id"], 42);
        assert_eq!(data["name"], "Joana Silva");
        assert_eq!(data["cpf"], "123.***.***-00");
        assert_eq!(data["phone"], "+55 11 *****-**21");
        assert_eq!(data["email"], "jo***@clinica.com.br");
        // `full` só vale para strings: o objeto é percorrido
        assert_eq!(data["address"]["street"], "***");
        assert_eq!(data["address"]["cep"], "***");
        assert_eq!(data["address"]["city"], "São Paulo");
        assert_eq!(data["organization"], "Clínica Bella");
        assert_eq!(data["medical_history"], "[REDACTED]");
        assert_eq!(data["diagnosis"], "[REDACTED]");
        assert_eq!(data["password"], "[REDACTED]");
        assert!(data["card_number"].as_str().unwrap().starts_with("tok_"));

        assert_eq!(
            outcome.audit.confidentiality,
            ConfidentialityLevel::HighlyConfidential
        );
    }

    #[test]
    fn test_exact_only_patterns_do_not_leak_into_other_fields() {
        let engine = builtin_engine();
        let ctx = MaskingContext::new("u1", "admin", View::Detail);

        let outcome = engine
            .mask(&json!({"rg": "12.345.678-9", "organization": "Clínica"}), &ctx)
            .unwrap();

        assert_eq!(outcome.data["organization"], "Clínica");
        assert_ne!(outcome.data["rg"], "12.345.678-9");
    }

    #[test]
    fn test_export_view_hashes_cpf() {
        let engine = builtin_engine();
        let ctx = MaskingContext::new("u1", "analyst", View::Export);

        let outcome = engine.mask(&json!({"cpf": "123.456.789-00"}), &ctx).unwrap();
        let hashed = outcome.data["cpf"].as_str().unwrap();

        assert!(hashed.starts_with("hash:"));
        assert_eq!(outcome.audit.masked_fields[0].rule_id, "cpf-export");
    }

    #[test]
    fn test_staff_list_view_uses_placeholder() {
        let engine = builtin_engine();
        let ctx = MaskingContext::new("u1", "receptionist", View::List);

        let outcome = engine.mask(&json!({"diagnosis": "melasma"}), &ctx).unwrap();
        assert_eq!(outcome.data["diagnosis"], "***");
        assert_eq!(outcome.audit.masked_fields[0].rule_id, "medical-record-staff-list");
    }

    #[test]
    fn test_emergency_access_releases_medical_only() {
        let engine = builtin_engine();
        let ctx = MaskingContext::new("u1", "nurse", View::Detail).with_emergency_access(true);

        let outcome = engine.mask(&patient(), &ctx).unwrap();

        assert_eq!(outcome.data["diagnosis"], "melasma");
        assert_eq!(outcome.data["medical_history"][0]["note"], "peeling químico");
        assert!(outcome.data["card_number"].as_str().unwrap().starts_with("tok_"));
        assert_eq!(outcome.data["password"], "[REDACTED]");

        let exempted: Vec<_> = outcome
            .audit
            .exempted_fields
            .iter()
            .map(|f| f.path.as_str())
            .collect();
        assert!(exempted.contains(&"diagnosis"));
        assert!(exempted.contains(&"medical_history"));
        assert!(outcome.audit.emergency_access);
    }

    #[test]
    fn test_idempotent_over_full_patient() {
        let engine = builtin_engine();
        for view in [View::List, View::Detail, View::Export, View::Audit] {
            let ctx = MaskingContext::new("u1", "receptionist", view);
            let once = engine.mask(&patient(), &ctx).unwrap().data;
            let twice = engine.mask(&once, &ctx).unwrap().data;
            assert_eq!(once, twice, "visão {view}");
        }
    }

    #[test]
    fn test_list_of_patients() {
        let engine = builtin_engine();
        let ctx = MaskingContext::new("u1", "receptionist", View::List);
        let data = json!({"patients": [patient(), patient()], "total": 2});

        let outcome = engine.mask(&data, &ctx).unwrap();

        assert_eq!(outcome.data["total"], 2);
        assert_eq!(outcome.data["patients"][1]["cpf"], "123.***.***-00");
        assert!(outcome
            .audit
            .masked_fields
            .iter()
            .any(|f| f.path == "patients[1].cpf"));
    }
}

// Regras vindas da configuração
mod configured_rules_tests {
    use super::*;

    #[test]
    fn test_rules_from_toml() {
        let config: Config = toml::from_str(
            r####"
[masking]
include_builtin_rules = false
placeholder = "###"

[[masking.rules]]
id = "insurance"
fields = ["insurance_number", "=convenio"]
category = "financial"
masking_type = "partial"
pattern = "generic"
priority = 20

[[masking.rules]]
id = "notes-for-marketing"
fields = ["notes"]
category = "medical"
masking_type = "full"
applies_to = "export"
priority = 10

[masking.rules.conditions]
purposes = ["marketing"]
"####,
        )
        .unwrap();

        let engine = MaskingEngine::from_config(&config.masking).unwrap();
        let data = json!({"insurance_number": "ABC1234567", "convenio": "Unimed", "notes": "x y z"});

        let marketing = MaskingContext::new("u", "analyst", View::Export).with_purpose("marketing");
        let outcome = engine.mask(&data, &marketing).unwrap();
        assert_eq!(outcome.data["insurance_number"], "AB******67");
        assert_eq!(outcome.data["convenio"], "Un**ed");
        assert_eq!(outcome.data["notes"], "###");

        let billing = MaskingContext::new("u", "analyst", View::Export).with_purpose("billing");
        let outcome = engine.mask(&data, &billing).unwrap();
        assert_eq!(outcome.data["notes"], "x y z");
    }

    #[test]
    fn test_unknown_masking_type_fails_at_registration() {
        let config: Config = toml::from_str(
            r#"
[[masking.rules]]
id = "broken-rule"
fields = ["cpf"]
category = "sensitive"
masking_type = "shuffle"
"#,
        )
        .unwrap();

        let err = MaskingEngine::from_config(&config.masking).unwrap_err();
        assert!(err.to_string().contains("broken-rule"));
    }

    #[test]
    fn test_priority_100_beats_50() {
        let mut registry = RuleRegistry::new();
        registry
            .add_rule(MaskingRule::new(
                "partial-cpf",
                &["cpf"],
                DataCategory::Sensitive,
                MaskingType::Partial(PartialPattern::Cpf),
                50,
            ))
            .unwrap();
        registry
            .add_rule(MaskingRule::new(
                "redact-cpf",
                &["cpf"],
                DataCategory::Sensitive,
                MaskingType::Redact,
                100,
            ))
            .unwrap();

        let engine = MaskingEngine::new(registry, Transformer::default());
        let ctx = MaskingContext::new("u", "admin", View::Detail);

        let outcome = engine.mask(&json!({"cpf": "123.456.789-00"}), &ctx).unwrap();
        assert_eq!(outcome.data["cpf"], "[REDACTED]");
    }
}
