//! Tipos das regras de mascaramento.
//!
//! Uma regra existe em duas formas:
//! - [`RuleDefinition`]: forma crua, como vem do `sigilo.toml`
//! - [`MaskingRule`]: forma validada, usada pelo motor

use serde::{Deserialize, Serialize};

use crate::{SigiloError, SigiloResult};

use super::context::{MaskingContext, View};

/// Categoria de dado tratado (LGPD).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    /// Dado pessoal comum (nome, endereço, contato).
    Personal,
    /// Dado pessoal sensível (origem, religião, documentos).
    Sensitive,
    /// Dado financeiro.
    Financial,
    /// Dado de saúde.
    Medical,
    /// Dado biométrico.
    Biometric,
}

impl DataCategory {
    /// Converte o nome usado na configuração.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "personal" => Some(DataCategory::Personal),
            "sensitive" => Some(DataCategory::Sensitive),
            "financial" => Some(DataCategory::Financial),
            "medical" => Some(DataCategory::Medical),
            "biometric" => Some(DataCategory::Biometric),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataCategory::Personal => write!(f, "personal"),
            DataCategory::Sensitive => write!(f, "sensitive"),
            DataCategory::Financial => write!(f, "financial"),
            DataCategory::Medical => write!(f, "medical"),
            DataCategory::Biometric => write!(f, "biometric"),
        }
    }
}

/// Padrão de mascaramento parcial.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PartialPattern {
    /// CPF: mantém os 3 primeiros e os 2 últimos dígitos.
    Cpf,
    /// CNPJ: mantém os 2 primeiros e os 2 últimos dígitos.
    Cnpj,
    /// Telefone: mantém DDI/DDD e os 2 últimos dígitos.
    Phone,
    /// E-mail: mantém 2 caracteres do usuário e o domínio.
    Email,
    /// Qualquer texto: mantém os 2 primeiros e os 2 últimos caracteres.
    Generic,
}

impl PartialPattern {
    /// Converte o nome usado na configuração.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cpf" => Some(PartialPattern::Cpf),
            "cnpj" => Some(PartialPattern::Cnpj),
            "phone" | "telefone" => Some(PartialPattern::Phone),
            "email" => Some(PartialPattern::Email),
            "generic" => Some(PartialPattern::Generic),
            _ => None,
        }
    }
}

impl std::fmt::Display for PartialPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartialPattern::Cpf => write!(f, "cpf"),
            PartialPattern::Cnpj => write!(f, "cnpj"),
            PartialPattern::Phone => write!(f, "phone"),
            PartialPattern::Email => write!(f, "email"),
            PartialPattern::Generic => write!(f, "generic"),
        }
    }
}

/// Tipo de mascaramento.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MaskingType {
    /// Substitui o valor inteiro por um placeholder fixo.
    Full,
    /// Mascara parte do valor segundo um padrão.
    Partial(PartialPattern),
    /// Digest determinístico e irreversível.
    Hash,
    /// Substituto que só pode ser revertido com um cofre externo.
    Tokenize,
    /// Remove o valor, deixando um marcador.
    Redact,
}

impl MaskingType {
    /// Nome curto do tipo (sem o padrão parcial).
    pub fn kind(&self) -> &'static str {
        match self {
            MaskingType::Full => "full",
            MaskingType::Partial(_) => "partial",
            MaskingType::Hash => "hash",
            MaskingType::Tokenize => "tokenize",
            MaskingType::Redact => "redact",
        }
    }

    /// Se a transformação só se aplica a strings.
    pub fn is_string_oriented(&self) -> bool {
        matches!(self, MaskingType::Full | MaskingType::Partial(_))
    }
}

impl std::fmt::Display for MaskingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaskingType::Partial(pattern) => write!(f, "partial:{}", pattern),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Em qual visão a regra vale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    /// Todas as visões.
    All,
    /// Apenas uma visão.
    Only(View),
}

impl Applicability {
    /// Verifica se a regra vale para a visão dada.
    pub fn matches(&self, view: View) -> bool {
        match self {
            Applicability::All => true,
            Applicability::Only(v) => *v == view,
        }
    }
}

impl std::fmt::Display for Applicability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Applicability::All => write!(f, "all"),
            Applicability::Only(view) => write!(f, "{}", view),
        }
    }
}

/// Condições para a regra valer.
///
/// Listas vazias não restringem nada.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleConditions {
    /// A regra vale se o papel do usuário estiver aqui.
    #[serde(default)]
    pub roles: Vec<String>,

    /// A regra vale se alguma finalidade declarada estiver aqui.
    #[serde(default)]
    pub purposes: Vec<String>,

    /// Se definido, o consentimento do contexto precisa ser igual.
    #[serde(default)]
    pub consent_given: Option<bool>,
}

impl RuleConditions {
    /// Avalia as condições contra o contexto.
    pub fn is_satisfied_by(&self, context: &MaskingContext) -> bool {
        let role_ok = self.roles.is_empty()
            || self
                .roles
                .iter()
                .any(|r| r.eq_ignore_ascii_case(&context.role));

        let purpose_ok = self.purposes.is_empty() || context.has_any_purpose(&self.purposes);

        let consent_ok = self
            .consent_given
            .map(|expected| expected == context.consent_given)
            .unwrap_or(true);

        role_ok && purpose_ok && consent_ok
    }
}

/// Regra crua, como escrita no arquivo de configuração.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleDefinition {
    /// ID único da regra.
    pub id: String,

    /// Padrões de nome de campo.
    pub fields: Vec<String>,

    /// Categoria do dado (personal, sensitive, financial, medical, biometric).
    pub category: String,

    /// Tipo de mascaramento (full, partial, hash, tokenize, redact).
    pub masking_type: String,

    /// Padrão do mascaramento parcial (cpf, cnpj, phone, email, generic).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Visão em que vale (all, list, detail, export, audit).
    #[serde(default = "default_applies_to")]
    pub applies_to: String,

    /// Condições opcionais.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<RuleConditions>,

    /// Prioridade (maior vence).
    #[serde(default)]
    pub priority: i32,
}

fn default_applies_to() -> String {
    "all".to_string()
}

/// Regra validada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskingRule {
    /// ID único da regra.
    pub id: String,

    /// Padrões de nome de campo, já em minúsculas.
    pub field_patterns: Vec<String>,

    /// Categoria do dado.
    pub category: DataCategory,

    /// Tipo de mascaramento.
    pub masking_type: MaskingType,

    /// Visão em que vale.
    pub applies_to: Applicability,

    /// Condições opcionais.
    pub conditions: Option<RuleConditions>,

    /// Prioridade (maior vence).
    pub priority: i32,
}

/// Como um nome de campo casou com a regra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldMatch {
    /// O padrão está contido no nome.
    Substring,
    /// O nome é igual ao padrão.
    Exact,
}

impl MaskingRule {
    /// Cria uma regra válida para todas as visões, sem condições.
    pub fn new(
        id: impl Into<String>,
        fields: &[&str],
        category: DataCategory,
        masking_type: MaskingType,
        priority: i32,
    ) -> Self {
        Self {
            id: id.into(),
            field_patterns: fields.iter().map(|f| f.to_lowercase()).collect(),
            category,
            masking_type,
            applies_to: Applicability::All,
            conditions: None,
            priority,
        }
    }

    /// Restringe a regra a uma visão.
    pub fn only_in(mut self, view: View) -> Self {
        self.applies_to = Applicability::Only(view);
        self
    }

    /// Define as condições.
    pub fn with_conditions(mut self, conditions: RuleConditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Verifica se o nome de campo casa com algum padrão.
    ///
    /// Padrões com prefixo `=` só casam por igualdade. Retorna o melhor
    /// tipo de match (exato vence substring).
    pub fn match_field(&self, field: &str) -> Option<FieldMatch> {
        let field = field.to_lowercase();
        self.field_patterns
            .iter()
            .filter_map(|pattern| {
                if let Some(exact) = pattern.strip_prefix('=') {
                    return (field == exact).then_some(FieldMatch::Exact);
                }
                if field == *pattern {
                    Some(FieldMatch::Exact)
                } else if field.contains(pattern.as_str()) {
                    Some(FieldMatch::Substring)
                } else {
                    None
                }
            })
            .max()
    }

    /// Valida a regra já construída.
    pub fn validate(&self) -> SigiloResult<()> {
        if self.id.trim().is_empty() {
            return Err(SigiloError::invalid_rule("<sem id>", "id vazio"));
        }
        if self.field_patterns.is_empty() {
            return Err(SigiloError::invalid_rule(
                &self.id,
                "nenhum padrão de campo informado",
            ));
        }
        if self
            .field_patterns
            .iter()
            .any(|p| p.trim_start_matches('=').trim().is_empty())
        {
            return Err(SigiloError::invalid_rule(&self.id, "padrão de campo vazio"));
        }
        Ok(())
    }

    /// Converte de volta para a forma crua.
    pub fn to_definition(&self) -> RuleDefinition {
        let (masking_type, pattern) = match self.masking_type {
            MaskingType::Partial(p) => ("partial".to_string(), Some(p.to_string())),
            other => (other.kind().to_string(), None),
        };

        RuleDefinition {
            id: self.id.clone(),
            fields: self.field_patterns.clone(),
            category: self.category.to_string(),
            masking_type,
            pattern,
            applies_to: self.applies_to.to_string(),
            conditions: self.conditions.clone(),
            priority: self.priority,
        }
    }
}

impl TryFrom<&RuleDefinition> for MaskingRule {
    type Error = SigiloError;

    fn try_from(def: &RuleDefinition) -> SigiloResult<Self> {
        let id = def.id.trim();
        if id.is_empty() {
            return Err(SigiloError::invalid_rule("<sem id>", "id vazio"));
        }

        let category = DataCategory::parse(&def.category).ok_or_else(|| {
            SigiloError::invalid_rule(id, format!("categoria desconhecida '{}'", def.category))
        })?;

        let masking_type = match def.masking_type.trim().to_lowercase().as_str() {
            "full" => MaskingType::Full,
            "hash" => MaskingType::Hash,
            "tokenize" => MaskingType::Tokenize,
            "redact" => MaskingType::Redact,
            "partial" => {
                let name = def.pattern.as_deref().unwrap_or("generic");
                let pattern = PartialPattern::parse(name).ok_or_else(|| {
                    SigiloError::invalid_rule(id, format!("padrão parcial desconhecido '{}'", name))
                })?;
                MaskingType::Partial(pattern)
            }
            other => {
                return Err(SigiloError::invalid_rule(
                    id,
                    format!("tipo de mascaramento desconhecido '{}'", other),
                ))
            }
        };

        let applies_to = match def.applies_to.trim().to_lowercase().as_str() {
            "all" | "" => Applicability::All,
            other => Applicability::Only(
                View::parse(other)
                    .map_err(|_| SigiloError::invalid_rule(id, format!("visão desconhecida '{}'", other)))?,
            ),
        };

        let rule = MaskingRule {
            id: id.to_string(),
            field_patterns: def.fields.iter().map(|f| f.trim().to_lowercase()).collect(),
            category,
            masking_type,
            applies_to,
            conditions: def.conditions.clone(),
            priority: def.priority,
        };
        rule.validate()?;

        Ok(rule)
    }
}
