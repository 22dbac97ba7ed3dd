//! Hooks padrão do Sigilo.
//!
//! - `LoggingHook`: registra cada mascaramento no log
//! - `MetricsHook`: contadores de mascaramento
//! - `AuditHook`: grava a trilha de auditoria no SQLite (feature `sqlite`)

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::types::audit::ConfidentialityLevel;
use crate::SigiloResult;

use super::{Hook, HookContext, HookEvent};

// ═══════════════════════════════════════════════════════════════════════════
// LoggingHook
// ═══════════════════════════════════════════════════════════════════════════

/// Hook que registra mascaramentos no log.
#[derive(Debug, Default)]
pub struct LoggingHook;

impl LoggingHook {
    /// Cria um novo LoggingHook.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Hook for LoggingHook {
    fn name(&self) -> &str {
        "logging"
    }

    fn event(&self) -> HookEvent {
        HookEvent::Masked
    }

    async fn execute(&self, context: &HookContext<'_>) -> SigiloResult<()> {
        if let HookContext::Masked {
            key,
            context,
            audit,
        } = context
        {
            tracing::info!(
                audit_id = %audit.id,
                key = %key,
                user_id = %context.user_id,
                role = %context.role,
                view = %context.view,
                masked_fields = audit.masked_fields.len(),
                confidentiality = %audit.confidentiality,
                "Query result masked"
            );

            if audit.emergency_access {
                tracing::warn!(
                    audit_id = %audit.id,
                    user_id = %context.user_id,
                    exempted_fields = audit.exempted_fields.len(),
                    "Emergency access - review required"
                );
            }
        }

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MetricsHook
// ═══════════════════════════════════════════════════════════════════════════

/// Hook que coleta métricas de mascaramento.
#[derive(Debug, Default)]
pub struct MetricsHook {
    /// Total de resultados mascarados.
    operations: AtomicU64,

    /// Total de campos mascarados.
    masked_fields: AtomicU64,

    /// Total de campos liberados por emergência.
    exempted_fields: AtomicU64,

    /// Total de acessos de emergência.
    emergency_accesses: AtomicU64,

    /// Resultados de confidencialidade alta.
    highly_confidential: AtomicU64,
}

impl MetricsHook {
    /// Cria um novo MetricsHook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retorna o total de operações.
    pub fn total_operations(&self) -> u64 {
        self.operations.load(Ordering::Relaxed)
    }

    /// Retorna o total de campos mascarados.
    pub fn total_masked_fields(&self) -> u64 {
        self.masked_fields.load(Ordering::Relaxed)
    }

    /// Retorna o total de campos liberados.
    pub fn total_exempted_fields(&self) -> u64 {
        self.exempted_fields.load(Ordering::Relaxed)
    }

    /// Retorna o total de acessos de emergência.
    pub fn total_emergency_accesses(&self) -> u64 {
        self.emergency_accesses.load(Ordering::Relaxed)
    }

    /// Média de campos mascarados por operação.
    pub fn average_masked_fields(&self) -> f64 {
        let total = self.total_operations();
        if total == 0 {
            0.0
        } else {
            self.total_masked_fields() as f64 / total as f64
        }
    }

    /// Retorna as métricas em formato estruturado.
    pub fn metrics(&self) -> Metrics {
        Metrics {
            operations: self.total_operations(),
            masked_fields: self.total_masked_fields(),
            exempted_fields: self.total_exempted_fields(),
            emergency_accesses: self.total_emergency_accesses(),
            highly_confidential: self.highly_confidential.load(Ordering::Relaxed),
            average_masked_fields: self.average_masked_fields(),
        }
    }
}

/// Métricas coletadas pelo MetricsHook.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub operations: u64,
    pub masked_fields: u64,
    pub exempted_fields: u64,
    pub emergency_accesses: u64,
    pub highly_confidential: u64,
    pub average_masked_fields: f64,
}

#[async_trait]
impl Hook for MetricsHook {
    fn name(&self) -> &str {
        "metrics"
    }

    fn event(&self) -> HookEvent {
        HookEvent::Masked
    }

    async fn execute(&self, context: &HookContext<'_>) -> SigiloResult<()> {
        if let HookContext::Masked { audit, .. } = context {
            self.operations.fetch_add(1, Ordering::Relaxed);
            self.masked_fields
                .fetch_add(audit.masked_fields.len() as u64, Ordering::Relaxed);
            self.exempted_fields
                .fetch_add(audit.exempted_fields.len() as u64, Ordering::Relaxed);

            if audit.emergency_access {
                self.emergency_accesses.fetch_add(1, Ordering::Relaxed);
            }
            if audit.confidentiality == ConfidentialityLevel::HighlyConfidential {
                self.highly_confidential.fetch_add(1, Ordering::Relaxed);
            }
        }

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// AuditHook
// ═══════════════════════════════════════════════════════════════════════════

/// Hook que grava cada mascaramento no log de auditoria.
#[cfg(feature = "sqlite")]
#[derive(Debug)]
pub struct AuditHook {
    log: std::sync::Mutex<crate::audit::AuditLog>,
}

#[cfg(feature = "sqlite")]
impl AuditHook {
    /// Cria um novo AuditHook.
    pub fn new(log: crate::audit::AuditLog) -> Self {
        Self {
            log: std::sync::Mutex::new(log),
        }
    }
}

#[cfg(feature = "sqlite")]
#[async_trait]
impl Hook for AuditHook {
    fn name(&self) -> &str {
        "audit"
    }

    fn event(&self) -> HookEvent {
        HookEvent::Masked
    }

    async fn execute(&self, context: &HookContext<'_>) -> SigiloResult<()> {
        if let HookContext::Masked { audit, .. } = context {
            let log = self
                .log
                .lock()
                .map_err(|_| crate::SigiloError::other("log de auditoria envenenado"))?;
            log.record(audit)?;
        }

        Ok(())
    }
}
