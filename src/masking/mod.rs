//! Motor de regras de mascaramento (LGPD).
//!
//! - [`RuleRegistry`]: regras ordenadas por prioridade
//! - [`MaskingEngine`]: aplica as regras a um payload JSON
//! - [`Transformer`]: as transformações `full`, `partial`, `hash`,
//!   `tokenize` e `redact`
//! - [`builtin_rules`]: conjunto padrão de regras

mod builtin;
mod engine;
mod registry;
mod transform;

pub use builtin::builtin_rules;
pub use engine::MaskingEngine;
pub use registry::RuleRegistry;
pub use transform::{Transformer, HASH_PREFIX, MASK_CHAR, TOKEN_PREFIX};
