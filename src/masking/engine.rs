//! Motor de mascaramento.
//!
//! Percorre um payload JSON e aplica, a cada campo, a regra de maior
//! prioridade que vale para o contexto. Produz um payload novo; a entrada
//! nunca é alterada.

use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};

use crate::types::audit::{
    ConfidentialityLevel, ExemptedField, MaskedField, MaskingAudit, MaskingOutcome,
};
use crate::types::config::MaskingConfig;
use crate::types::context::MaskingContext;
use crate::types::rules::{DataCategory, FieldMatch, MaskingRule};
use crate::{SigiloError, SigiloResult};

use super::registry::RuleRegistry;
use super::transform::Transformer;

/// Motor de mascaramento.
///
/// Clones compartilham o mesmo registro de regras.
#[derive(Clone)]
pub struct MaskingEngine {
    registry: Arc<RwLock<RuleRegistry>>,
    transformer: Transformer,
}

/// Regras selecionadas para um contexto.
struct Candidates<'r> {
    /// Regras que podem ser aplicadas, em ordem de prioridade.
    active: Vec<&'r MaskingRule>,
    /// Regras médicas liberadas por acesso de emergência.
    exempted: Vec<&'r MaskingRule>,
}

impl MaskingEngine {
    /// Cria um novo motor.
    pub fn new(registry: RuleRegistry, transformer: Transformer) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            transformer,
        }
    }

    /// Monta o motor a partir da configuração.
    pub fn from_config(config: &MaskingConfig) -> SigiloResult<Self> {
        let registry = RuleRegistry::from_config(config)?;
        Ok(Self::new(registry, Transformer::from_config(config)))
    }

    /// Transformador em uso.
    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// Registra uma regra em tempo de execução.
    pub fn add_rule(&self, rule: MaskingRule) -> SigiloResult<()> {
        self.registry
            .write()
            .map_err(|_| poisoned())?
            .add_rule(rule)
    }

    /// Remove uma regra em tempo de execução.
    pub fn remove_rule(&self, id: &str) -> SigiloResult<Option<MaskingRule>> {
        Ok(self
            .registry
            .write()
            .map_err(|_| poisoned())?
            .remove_rule(id))
    }

    /// Cópia das regras atuais, em ordem de prioridade.
    pub fn rules(&self) -> SigiloResult<Vec<MaskingRule>> {
        Ok(self
            .registry
            .read()
            .map_err(|_| poisoned())?
            .rules()
            .to_vec())
    }

    /// Mascara o payload com as regras registradas.
    ///
    /// Falha se o registro estiver inacessível: nunca devolve dados sem
    /// mascaramento.
    pub fn mask(&self, data: &Value, context: &MaskingContext) -> SigiloResult<MaskingOutcome> {
        let registry = self.registry.read().map_err(|_| poisoned())?;
        Ok(self.mask_with_rules(data, context, &registry))
    }

    /// Mascara o payload com um conjunto de regras específico.
    pub fn mask_with_rules(
        &self,
        data: &Value,
        context: &MaskingContext,
        rules: &RuleRegistry,
    ) -> MaskingOutcome {
        let candidates = select_candidates(rules.rules(), context);
        let mut audit = MaskingAudit::for_context(context);

        let masked = self.walk(data, "", &candidates, &mut audit);
        audit.confidentiality = confidentiality_of(&audit, rules);

        tracing::debug!(
            user_id = %context.user_id,
            view = %context.view,
            candidates = candidates.active.len(),
            masked_fields = audit.masked_fields.len(),
            exempted_fields = audit.exempted_fields.len(),
            confidentiality = %audit.confidentiality,
            "Payload masked"
        );

        if !audit.exempted_fields.is_empty() {
            tracing::warn!(
                user_id = %context.user_id,
                role = %context.role,
                fields = audit.exempted_fields.len(),
                "Emergency access released medical fields"
            );
        }

        MaskingOutcome {
            data: masked,
            audit,
        }
    }

    fn walk(
        &self,
        value: &Value,
        path: &str,
        candidates: &Candidates<'_>,
        audit: &mut MaskingAudit,
    ) -> Value {
        match value {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, item) in map {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };
                    let masked = self.mask_field(key, item, &child_path, candidates, audit);
                    out.insert(key.clone(), masked);
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        self.walk(item, &format!("{}[{}]", path, i), candidates, audit)
                    })
                    .collect(),
            ),
            scalar => scalar.clone(),
        }
    }

    fn mask_field(
        &self,
        key: &str,
        value: &Value,
        path: &str,
        candidates: &Candidates<'_>,
        audit: &mut MaskingAudit,
    ) -> Value {
        if let Some(rule) = select_rule(&candidates.active, key) {
            if let Some(masked) = self.transformer.apply(rule.masking_type, value) {
                // Valor que já estava mascarado não conta como mascaramento
                if masked != *value {
                    audit.masked_fields.push(MaskedField {
                        path: path.to_string(),
                        rule_id: rule.id.clone(),
                        category: rule.category,
                        masking_type: rule.masking_type.to_string(),
                    });
                }
                return masked;
            }
        } else if let Some(rule) = select_rule(&candidates.exempted, key) {
            if !value.is_null() {
                audit.exempted_fields.push(ExemptedField {
                    path: path.to_string(),
                    rule_id: rule.id.clone(),
                });
            }
        }

        self.walk(value, path, candidates, audit)
    }
}

impl std::fmt::Debug for MaskingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rules = self.registry.read().map(|r| r.len()).unwrap_or(0);
        f.debug_struct("MaskingEngine")
            .field("rules", &rules)
            .field("transformer", &self.transformer)
            .finish()
    }
}

fn poisoned() -> SigiloError {
    SigiloError::Masking {
        rule_id: "*".to_string(),
        reason: "registro de regras envenenado".to_string(),
    }
}

/// Separa as regras que valem para o contexto.
fn select_candidates<'r>(rules: &'r [MaskingRule], context: &MaskingContext) -> Candidates<'r> {
    let mut active = Vec::new();
    let mut exempted = Vec::new();

    for rule in rules {
        if !rule.applies_to.matches(context.view) {
            continue;
        }
        if let Some(conditions) = &rule.conditions {
            if !conditions.is_satisfied_by(context) {
                continue;
            }
        }
        // Emergência libera só dados médicos
        if context.is_emergency_access && rule.category == DataCategory::Medical {
            exempted.push(rule);
        } else {
            active.push(rule);
        }
    }

    Candidates { active, exempted }
}

/// Escolhe a regra para o campo: match exato de maior prioridade, senão
/// match por substring de maior prioridade.
fn select_rule<'r>(rules: &[&'r MaskingRule], field: &str) -> Option<&'r MaskingRule> {
    let mut substring = None;

    for rule in rules {
        match rule.match_field(field) {
            Some(FieldMatch::Exact) => return Some(rule),
            Some(FieldMatch::Substring) if substring.is_none() => substring = Some(*rule),
            _ => {}
        }
    }

    substring
}

/// Nível de confidencialidade a partir das categorias tocadas.
fn confidentiality_of(audit: &MaskingAudit, rules: &RuleRegistry) -> ConfidentialityLevel {
    let masked = audit.masked_fields.iter().map(|f| f.category);
    let exempted = audit
        .exempted_fields
        .iter()
        .filter_map(|f| rules.get(&f.rule_id).map(|r| r.category));

    let base = masked
        .chain(exempted)
        .map(ConfidentialityLevel::base_for)
        .max()
        .unwrap_or(ConfidentialityLevel::Public);

    if audit.any_masked() {
        base.escalate()
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::context::View;
    use crate::types::rules::{MaskingType, PartialPattern, RuleConditions};
    use serde_json::json;

    fn engine_with(rules: Vec<MaskingRule>) -> MaskingEngine {
        let mut registry = RuleRegistry::new();
        for rule in rules {
            registry.add_rule(rule).unwrap();
        }
        MaskingEngine::new(registry, Transformer::default())
    }

    fn ctx(view: View) -> MaskingContext {
        MaskingContext::new("user-1", "receptionist", view)
    }

    fn cpf_rule() -> MaskingRule {
        MaskingRule::new(
            "cpf",
            &["cpf"],
            DataCategory::Sensitive,
            MaskingType::Partial(PartialPattern::Cpf),
            100,
        )
    }

    #[test]
    fn test_cpf_end_to_end() {
        let engine = engine_with(vec![cpf_rule()]);
        let outcome = engine
            .mask(&json!({"cpf": "123.456.789-00"}), &ctx(View::Detail))
            .unwrap();

        assert_eq!(outcome.data, json!({"cpf": "123.***.***-00"}));
        assert_eq!(outcome.audit.masked_fields.len(), 1);
        assert_eq!(outcome.audit.masked_fields[0].path, "cpf");
        assert_eq!(outcome.audit.masked_fields[0].masking_type, "partial:cpf");
    }

    #[test]
    fn test_nested_structures_and_paths() {
        let engine = engine_with(vec![cpf_rule()]);
        let data = json!({
            "clinic": "Bella Pele",
            "patients": [
                {"name": "Ana", "cpf": "123.456.789-00", "visits": 3},
                {"name": "Bia", "cpf": null}
            ]
        });

        let outcome = engine.mask(&data, &ctx(View::List)).unwrap();

        assert_eq!(outcome.data["clinic"], "Bella Pele");
        assert_eq!(outcome.data["patients"][0]["cpf"], "123.***.***-00");
        assert_eq!(outcome.data["patients"][0]["visits"], 3);
        assert_eq!(outcome.data["patients"][1]["cpf"], Value::Null);
        assert_eq!(outcome.audit.masked_fields.len(), 1);
        assert_eq!(outcome.audit.masked_fields[0].path, "patients[0].cpf");
    }

    #[test]
    fn test_input_is_not_mutated() {
        let engine = engine_with(vec![cpf_rule()]);
        let data = json!({"cpf": "123.456.789-00"});
        let before = data.clone();

        let _ = engine.mask(&data, &ctx(View::List)).unwrap();
        assert_eq!(data, before);
    }

    #[test]
    fn test_priority_wins() {
        let engine = engine_with(vec![
            MaskingRule::new("low", &["cpf"], DataCategory::Sensitive, MaskingType::Full, 50),
            MaskingRule::new("high", &["cpf"], DataCategory::Sensitive, MaskingType::Redact, 100),
        ]);

        let outcome = engine.mask(&json!({"cpf": "123"}), &ctx(View::List)).unwrap();
        assert_eq!(outcome.data["cpf"], "[REDACTED]");
        assert_eq!(outcome.audit.masked_fields[0].rule_id, "high");
    }

    #[test]
    fn test_equal_priority_uses_registration_order() {
        // Empate de prioridade: escolha de implementação, a primeira
        // registrada vence.
        let engine = engine_with(vec![
            MaskingRule::new("first", &["cpf"], DataCategory::Sensitive, MaskingType::Redact, 10),
            MaskingRule::new("second", &["cpf"], DataCategory::Sensitive, MaskingType::Full, 10),
        ]);

        let outcome = engine.mask(&json!({"cpf": "123"}), &ctx(View::List)).unwrap();
        assert_eq!(outcome.audit.masked_fields[0].rule_id, "first");
    }

    #[test]
    fn test_exact_match_beats_substring() {
        let engine = engine_with(vec![
            MaskingRule::new("any-phone", &["phone"], DataCategory::Personal, MaskingType::Redact, 100),
            MaskingRule::new("mobile", &["mobile_phone"], DataCategory::Personal, MaskingType::Full, 10),
        ]);

        let outcome = engine
            .mask(&json!({"mobile_phone": "11987654321", "home_phone": "1133334444"}), &ctx(View::List))
            .unwrap();

        assert_eq!(outcome.data["mobile_phone"], "***");
        assert_eq!(outcome.data["home_phone"], "[REDACTED]");
    }

    #[test]
    fn test_view_applicability() {
        let engine = engine_with(vec![cpf_rule().only_in(View::Export)]);
        let data = json!({"cpf": "123.456.789-00"});

        let list = engine.mask(&data, &ctx(View::List)).unwrap();
        let export = engine.mask(&data, &ctx(View::Export)).unwrap();

        assert_eq!(list.data, data);
        assert_eq!(export.data["cpf"], "123.***.***-00");
    }

    #[test]
    fn test_role_conditions() {
        let rule = MaskingRule::new("notes", &["notes"], DataCategory::Medical, MaskingType::Redact, 10)
            .with_conditions(RuleConditions {
                roles: vec!["receptionist".to_string()],
                ..RuleConditions::default()
            });
        let engine = engine_with(vec![rule]);
        let data = json!({"notes": "pós-operatório"});

        let receptionist = engine.mask(&data, &ctx(View::Detail)).unwrap();
        let doctor = engine
            .mask(&data, &MaskingContext::new("u", "doctor", View::Detail))
            .unwrap();

        assert_eq!(receptionist.data["notes"], "[REDACTED]");
        assert_eq!(doctor.data["notes"], "pós-operatório");
    }

    #[test]
    fn test_emergency_access_releases_only_medical() {
        let engine = engine_with(vec![
            MaskingRule::new("diag", &["diagnosis"], DataCategory::Medical, MaskingType::Redact, 10),
            MaskingRule::new("card", &["card_number"], DataCategory::Financial, MaskingType::Redact, 10),
        ]);
        let data = json!({"diagnosis": "hipertensão", "card_number": "4111111111111111"});
        let context = ctx(View::Detail).with_emergency_access(true);

        let outcome = engine.mask(&data, &context).unwrap();

        assert_eq!(outcome.data["diagnosis"], "hipertensão");
        assert_eq!(outcome.data["card_number"], "[REDACTED]");
        assert_eq!(outcome.audit.exempted_fields.len(), 1);
        assert_eq!(outcome.audit.exempted_fields[0].rule_id, "diag");
        assert!(outcome.audit.emergency_access);
    }

    #[test]
    fn test_string_rule_on_structure_recurses() {
        let engine = engine_with(vec![
            MaskingRule::new("addr", &["address"], DataCategory::Personal, MaskingType::Full, 10),
            cpf_rule(),
        ]);
        let data = json!({"address": {"street": "Rua A", "cpf": "123.456.789-00"}});

        let outcome = engine.mask(&data, &ctx(View::List)).unwrap();
        assert_eq!(outcome.data["address"]["street"], "Rua A");
        assert_eq!(outcome.data["address"]["cpf"], "123.***.***-00");
    }

    #[test]
    fn test_redact_replaces_structures() {
        let engine = engine_with(vec![MaskingRule::new(
            "history",
            &["medical_history"],
            DataCategory::Medical,
            MaskingType::Redact,
            10,
        )]);
        let data = json!({"medical_history": [{"date": "2024-01-01", "note": "x"}]});

        let outcome = engine.mask(&data, &ctx(View::Detail)).unwrap();
        assert_eq!(outcome.data["medical_history"], "[REDACTED]");
    }

    #[test]
    fn test_masking_twice_is_idempotent() {
        let engine = MaskingEngine::new(RuleRegistry::with_builtin(), Transformer::default());
        let data = json!({
            "name": "Joana",
            "cpf": "123.456.789-00",
            "phone": "+55 11 98765-4321",
            "email": "joana@clinica.com",
            "card_number": "4111111111111111",
            "cartao_sus": "898001160000000",
            "diagnosis": "dermatite",
            "address": "Rua das Flores, 10",
            "password": "hunter2"
        });
        let context = ctx(View::Detail);

        let once = engine.mask(&data, &context).unwrap().data;
        let twice = engine.mask(&once, &context).unwrap().data;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_prefix_lookalike_secrets_are_masked() {
        let engine = engine_with(vec![
            MaskingRule::new("password", &["password"], DataCategory::Sensitive, MaskingType::Redact, 10),
            MaskingRule::new("api-key", &["api_key"], DataCategory::Sensitive, MaskingType::Hash, 10),
        ]);
        let data = json!({"password": "tok_MySecret!", "api_key": "hash:live-9f8e7d"});

        let outcome = engine.mask(&data, &ctx(View::Detail)).unwrap();

        assert_eq!(outcome.data["password"], "[REDACTED]");
        assert_ne!(outcome.data["api_key"], "hash:live-9f8e7d");
        assert!(outcome.data["api_key"].as_str().unwrap().starts_with("hash:"));
        assert_eq!(outcome.audit.masked_fields.len(), 2);
    }

    #[test]
    fn test_already_masked_values_are_not_audited() {
        let engine = MaskingEngine::new(RuleRegistry::with_builtin(), Transformer::default());
        let context = ctx(View::Detail);
        let data = json!({"cpf": "123.456.789-00", "card_number": "4111111111111111"});

        let first = engine.mask(&data, &context).unwrap();
        let second = engine.mask(&first.data, &context).unwrap();

        assert_eq!(first.audit.masked_fields.len(), 2);
        assert_eq!(second.data, first.data);
        assert!(second.audit.masked_fields.is_empty());
        assert_eq!(second.audit.confidentiality, ConfidentialityLevel::Public);
    }

    #[test]
    fn test_confidentiality_levels() {
        let engine = MaskingEngine::new(RuleRegistry::with_builtin(), Transformer::default());
        let context = ctx(View::Detail);

        let plain = engine.mask(&json!({"name": "Joana"}), &context).unwrap();
        assert_eq!(plain.audit.confidentiality, ConfidentialityLevel::Public);

        let personal = engine.mask(&json!({"email": "joana@x.com"}), &context).unwrap();
        assert_eq!(personal.audit.confidentiality, ConfidentialityLevel::Restricted);

        let financial = engine.mask(&json!({"card_number": "4111"}), &context).unwrap();
        assert_eq!(financial.audit.confidentiality, ConfidentialityLevel::Confidential);

        let medical = engine.mask(&json!({"diagnosis": "x"}), &context).unwrap();
        assert_eq!(medical.audit.confidentiality, ConfidentialityLevel::HighlyConfidential);

        // Emergência: nada mascarado, mas dado médico foi tocado
        let emergency = engine
            .mask(&json!({"diagnosis": "x"}), &context.clone().with_emergency_access(true))
            .unwrap();
        assert_eq!(emergency.audit.confidentiality, ConfidentialityLevel::Confidential);
    }

    #[test]
    fn test_runtime_add_and_remove() {
        let engine = engine_with(vec![]);
        let data = json!({"cpf": "123.456.789-00"});

        engine.add_rule(cpf_rule()).unwrap();
        assert_eq!(engine.mask(&data, &ctx(View::List)).unwrap().data["cpf"], "123.***.***-00");

        assert!(engine.remove_rule("cpf").unwrap().is_some());
        assert_eq!(engine.mask(&data, &ctx(View::List)).unwrap().data, data);
    }

    #[test]
    fn test_clones_share_registry() {
        let engine = engine_with(vec![]);
        let clone = engine.clone();
        engine.add_rule(cpf_rule()).unwrap();
        assert_eq!(clone.rules().unwrap().len(), 1);
    }
}
