//! Tipos de erro do Sigilo.

use thiserror::Error;

/// Tipo de resultado padrão do Sigilo.
pub type SigiloResult<T> = Result<T, SigiloError>;

/// Erros possíveis no Sigilo.
#[derive(Error, Debug)]
pub enum SigiloError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regra de mascaramento '{rule_id}' inválida: {reason}")]
    InvalidRule { rule_id: String, reason: String },

    #[error("Regra de mascaramento '{0}' já registrada")]
    DuplicateRule(String),

    #[error("Falha ao aplicar a regra '{rule_id}': {reason}")]
    Masking { rule_id: String, reason: String },

    #[cfg(feature = "sqlite")]
    #[error("Erro no banco de auditoria: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuração não encontrada em: {0}")]
    ConfigNotFound(String),

    #[error("{0}")]
    Other(String),
}

impl SigiloError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro de regra inválida.
    pub fn invalid_rule<I: Into<String>, R: Into<String>>(rule_id: I, reason: R) -> Self {
        Self::InvalidRule {
            rule_id: rule_id.into(),
            reason: reason.into(),
        }
    }
}
