//! Sistema de hooks do Sigilo.
//!
//! Hooks observam o fluxo do composer em pontos específicos:
//!
//! - `cache_hit`: resultado servido do cache
//! - `cache_miss`: resultado ausente, a busca vai acontecer
//! - `masked`: resultado buscado e mascarado, antes de ir para o cache
//!
//! Hooks só observam: nenhum deles altera o valor nem a escrita no cache.

mod builtin;

#[cfg(feature = "sqlite")]
pub use builtin::AuditHook;
pub use builtin::{LoggingHook, Metrics, MetricsHook};

use async_trait::async_trait;

use crate::types::audit::MaskingAudit;
use crate::types::context::MaskingContext;
use crate::SigiloResult;

// ═══════════════════════════════════════════════════════════════════════════
// Tipos de eventos
// ═══════════════════════════════════════════════════════════════════════════

/// Evento que dispara um hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    /// Resultado encontrado no cache.
    CacheHit,

    /// Resultado ausente no cache.
    CacheMiss,

    /// Resultado mascarado após a busca.
    Masked,
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookEvent::CacheHit => write!(f, "cache_hit"),
            HookEvent::CacheMiss => write!(f, "cache_miss"),
            HookEvent::Masked => write!(f, "masked"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Contexto de hooks
// ═══════════════════════════════════════════════════════════════════════════

/// Contexto passado para hooks.
pub enum HookContext<'a> {
    /// Contexto para cache_hit.
    CacheHit {
        /// Chave com escopo do contexto.
        key: &'a str,
        /// Contexto da requisição.
        context: &'a MaskingContext,
    },

    /// Contexto para cache_miss.
    CacheMiss {
        /// Chave com escopo do contexto.
        key: &'a str,
        /// Contexto da requisição.
        context: &'a MaskingContext,
    },

    /// Contexto para masked.
    Masked {
        /// Chave com escopo do contexto.
        key: &'a str,
        /// Contexto da requisição.
        context: &'a MaskingContext,
        /// Registro de auditoria do mascaramento.
        audit: &'a MaskingAudit,
    },
}

impl<'a> HookContext<'a> {
    /// Retorna o evento correspondente ao contexto.
    pub fn event(&self) -> HookEvent {
        match self {
            HookContext::CacheHit { .. } => HookEvent::CacheHit,
            HookContext::CacheMiss { .. } => HookEvent::CacheMiss,
            HookContext::Masked { .. } => HookEvent::Masked,
        }
    }

    /// Chave com escopo do contexto.
    pub fn key(&self) -> &str {
        match self {
            HookContext::CacheHit { key, .. }
            | HookContext::CacheMiss { key, .. }
            | HookContext::Masked { key, .. } => key,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Trait Hook
// ═══════════════════════════════════════════════════════════════════════════

/// Trait para hooks customizáveis.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Nome do hook.
    fn name(&self) -> &str;

    /// Evento que dispara este hook.
    fn event(&self) -> HookEvent;

    /// Executa o hook.
    async fn execute(&self, context: &HookContext<'_>) -> SigiloResult<()>;
}

// ═══════════════════════════════════════════════════════════════════════════
// Sistema de hooks
// ═══════════════════════════════════════════════════════════════════════════

/// Gerenciador de hooks.
///
/// Falhas de hooks são registradas no log e não interrompem a leitura.
#[derive(Default)]
pub struct HookSystem {
    cache_hit: Vec<Box<dyn Hook>>,
    cache_miss: Vec<Box<dyn Hook>>,
    masked: Vec<Box<dyn Hook>>,
}

impl HookSystem {
    /// Cria um novo sistema de hooks vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cria um sistema com hooks padrão (logging).
    pub fn with_defaults() -> Self {
        let mut system = Self::new();
        system.register(Box::new(LoggingHook));
        system
    }

    /// Registra um hook.
    pub fn register(&mut self, hook: Box<dyn Hook>) {
        let event = hook.event();
        tracing::debug!(
            hook_name = hook.name(),
            event = %event,
            "Registering hook"
        );

        match event {
            HookEvent::CacheHit => self.cache_hit.push(hook),
            HookEvent::CacheMiss => self.cache_miss.push(hook),
            HookEvent::Masked => self.masked.push(hook),
        }
    }

    /// Executa hooks de cache_hit.
    pub async fn run_cache_hit(&self, key: &str, context: &MaskingContext) {
        let hook_context = HookContext::CacheHit { key, context };
        Self::run_all(&self.cache_hit, &hook_context).await;
    }

    /// Executa hooks de cache_miss.
    pub async fn run_cache_miss(&self, key: &str, context: &MaskingContext) {
        let hook_context = HookContext::CacheMiss { key, context };
        Self::run_all(&self.cache_miss, &hook_context).await;
    }

    /// Executa hooks de masked.
    pub async fn run_masked(&self, key: &str, context: &MaskingContext, audit: &MaskingAudit) {
        let hook_context = HookContext::Masked {
            key,
            context,
            audit,
        };
        Self::run_all(&self.masked, &hook_context).await;
    }

    async fn run_all(hooks: &[Box<dyn Hook>], context: &HookContext<'_>) {
        for hook in hooks {
            if let Err(e) = hook.execute(context).await {
                tracing::warn!(
                    hook_name = hook.name(),
                    event = %context.event(),
                    error = %e,
                    "Hook failed"
                );
            }
        }
    }

    /// Retorna o número total de hooks registrados.
    pub fn count(&self) -> usize {
        self.cache_hit.len() + self.cache_miss.len() + self.masked.len()
    }

    /// Retorna o número de hooks para um evento específico.
    pub fn count_for_event(&self, event: HookEvent) -> usize {
        match event {
            HookEvent::CacheHit => self.cache_hit.len(),
            HookEvent::CacheMiss => self.cache_miss.len(),
            HookEvent::Masked => self.masked.len(),
        }
    }
}

impl std::fmt::Debug for HookSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookSystem")
            .field("cache_hit", &self.cache_hit.len())
            .field("cache_miss", &self.cache_miss.len())
            .field("masked", &self.masked.len())
            .finish()
    }
}
