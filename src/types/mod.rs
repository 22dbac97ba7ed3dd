//! Tipos compartilhados do Sigilo.

pub mod audit;
pub mod config;
pub mod context;
pub mod errors;
pub mod rules;

pub use audit::{ConfidentialityLevel, ExemptedField, MaskedField, MaskingAudit, MaskingOutcome};
pub use context::{MaskingContext, View};
pub use rules::{
    Applicability, DataCategory, FieldMatch, MaskingRule, MaskingType, PartialPattern,
    RuleConditions, RuleDefinition,
};
