//! # Sigilo
//!
//! Cache de consultas com TTL e motor de mascaramento de dados pessoais
//! (LGPD) para backends de clínicas.
//!
//! O fluxo principal passa pelo [`composer::Composer`]: verifica o cache,
//! busca os dados quando necessário, aplica as regras de mascaramento
//! conforme o contexto de quem lê e guarda o resultado já mascarado.
//!
//! ## Módulos
//!
//! - [`cache`] - Cache chave→valor com expiração por entrada
//! - [`masking`] - Regras e motor de mascaramento
//! - [`composer`] - Composição cache → busca → mascaramento
//! - [`hooks`] - Sistema de hooks para observar o fluxo
//! - [`audit`] - Trilha de auditoria em SQLite
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Tipos compartilhados

#[cfg(feature = "sqlite")]
pub mod audit;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod composer;
pub mod hooks;
pub mod masking;
pub mod types;

pub use types::config::Config;
pub use types::errors::{SigiloError, SigiloResult};
