//! Registro de regras de mascaramento.

use sha2::{Digest, Sha256};

use crate::types::config::MaskingConfig;
use crate::types::rules::{MaskingRule, RuleDefinition};
use crate::{SigiloError, SigiloResult};

use super::builtin::builtin_rules;

/// Lista de regras ordenada por prioridade decrescente.
///
/// Regras com a mesma prioridade mantêm a ordem de registro.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<MaskingRule>,
}

impl RuleRegistry {
    /// Cria um registro vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cria um registro com as regras padrão.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for rule in builtin_rules() {
            registry.rules.push(rule);
        }
        registry.sort();
        registry
    }

    /// Monta o registro a partir da configuração.
    pub fn from_config(config: &MaskingConfig) -> SigiloResult<Self> {
        let mut registry = if config.include_builtin_rules {
            Self::with_builtin()
        } else {
            Self::new()
        };

        for definition in &config.rules {
            registry.add_definition(definition)?;
        }

        tracing::debug!(rules = registry.len(), "masking rules registered");
        Ok(registry)
    }

    /// Registra uma regra já construída.
    pub fn add_rule(&mut self, rule: MaskingRule) -> SigiloResult<()> {
        rule.validate()?;

        if self.get(&rule.id).is_some() {
            return Err(SigiloError::DuplicateRule(rule.id));
        }

        tracing::debug!(
            rule_id = %rule.id,
            priority = rule.priority,
            masking_type = %rule.masking_type,
            "Registering masking rule"
        );

        self.rules.push(rule);
        self.sort();
        Ok(())
    }

    /// Valida e registra uma regra crua.
    pub fn add_definition(&mut self, definition: &RuleDefinition) -> SigiloResult<()> {
        let rule = MaskingRule::try_from(definition)?;
        self.add_rule(rule)
    }

    /// Remove uma regra pelo ID.
    pub fn remove_rule(&mut self, id: &str) -> Option<MaskingRule> {
        let index = self.rules.iter().position(|r| r.id == id)?;
        tracing::debug!(rule_id = id, "Removing masking rule");
        Some(self.rules.remove(index))
    }

    /// Busca uma regra pelo ID.
    pub fn get(&self, id: &str) -> Option<&MaskingRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Regras em ordem de prioridade.
    pub fn rules(&self) -> &[MaskingRule] {
        &self.rules
    }

    /// Número de regras.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Se não há regras.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Impressão digital do conjunto de regras.
    ///
    /// Muda com qualquer alteração de ID, campos, tipo, visão, condições
    /// ou prioridade, e com a ordem resultante.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for rule in &self.rules {
            let definition = serde_json::to_vec(&rule.to_definition()).unwrap_or_default();
            hasher.update(&definition);
            hasher.update([0]);
        }
        hex::encode(&hasher.finalize()[..8])
    }

    fn sort(&mut self) {
        // sort_by é estável: empates mantêm a ordem de registro
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }
}
