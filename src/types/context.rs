//! Contexto de quem está lendo os dados.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{SigiloError, SigiloResult};

/// Visão de saída em que o payload será apresentado.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Listagens (agenda, lista de pacientes).
    List,
    /// Tela de detalhe de um registro.
    Detail,
    /// Exportação (CSV, relatórios).
    Export,
    /// Trilha de auditoria.
    Audit,
}

impl View {
    /// Converte o nome usado na configuração.
    pub fn parse(value: &str) -> SigiloResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "list" => Ok(View::List),
            "detail" => Ok(View::Detail),
            "export" => Ok(View::Export),
            "audit" => Ok(View::Audit),
            other => Err(SigiloError::config(format!("visão desconhecida: {other}"))),
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::List => write!(f, "list"),
            View::Detail => write!(f, "detail"),
            View::Export => write!(f, "export"),
            View::Audit => write!(f, "audit"),
        }
    }
}

/// Contexto de mascaramento.
///
/// Somente leitura durante a avaliação das regras; nunca faz parte do
/// payload mascarado.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MaskingContext {
    /// Identificador do usuário que fez a requisição.
    pub user_id: String,

    /// Papel do usuário (admin, doctor, receptionist...).
    pub role: String,

    /// Finalidades declaradas para o tratamento dos dados.
    #[serde(default)]
    pub purposes: Vec<String>,

    /// Se o titular deu consentimento.
    #[serde(default)]
    pub consent_given: bool,

    /// Acesso de emergência (libera apenas dados médicos).
    #[serde(default)]
    pub is_emergency_access: bool,

    /// Visão de saída.
    pub view: View,
}

impl MaskingContext {
    /// Cria um novo contexto.
    pub fn new(user_id: impl Into<String>, role: impl Into<String>, view: View) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
            purposes: Vec::new(),
            consent_given: false,
            is_emergency_access: false,
            view,
        }
    }

    /// Adiciona uma finalidade declarada.
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purposes.push(purpose.into());
        self
    }

    /// Define o consentimento.
    pub fn with_consent(mut self, consent: bool) -> Self {
        self.consent_given = consent;
        self
    }

    /// Marca como acesso de emergência.
    pub fn with_emergency_access(mut self, emergency: bool) -> Self {
        self.is_emergency_access = emergency;
        self
    }

    /// Verifica se alguma das finalidades declaradas está na lista.
    pub fn has_any_purpose(&self, purposes: &[String]) -> bool {
        self.purposes
            .iter()
            .any(|p| purposes.iter().any(|q| q.eq_ignore_ascii_case(p)))
    }

    /// Impressão digital do contexto.
    ///
    /// Inclui tudo que altera o resultado do mascaramento, exceto o
    /// `user_id`. Papel e finalidades usam a mesma normalização ASCII das
    /// condições das regras; finalidades são ordenadas.
    pub fn fingerprint(&self) -> String {
        let mut purposes: Vec<String> = self
            .purposes
            .iter()
            .map(|p| p.to_ascii_lowercase())
            .collect();
        purposes.sort();
        purposes.dedup();

        let mut hasher = Sha256::new();
        hasher.update(self.role.to_ascii_lowercase().as_bytes());
        hasher.update([0]);
        hasher.update(purposes.join(",").as_bytes());
        hasher.update([0]);
        hasher.update([self.consent_given as u8, self.is_emergency_access as u8]);
        hasher.update(self.view.to_string().as_bytes());

        hex::encode(&hasher.finalize()[..8])
    }
}
