//! Composição de resultados de consulta.
//!
//! Fluxo: cache → busca → mascaramento → cache → retorno.
//!
//! ```text
//! chamador ──► Composer ──► TtlCache ── hit ──► valor mascarado
//!                              │
//!                             miss
//!                              ▼
//!                        fetch (externo) ──► MaskingEngine ──► TtlCache
//! ```

mod aggregate;

pub use aggregate::{summarize, GroupStats, Summary};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cache::{spawn_cleanup, CacheStats, SharedCache};
use crate::hooks::HookSystem;
use crate::masking::{MaskingEngine, RuleRegistry};
use crate::types::audit::MaskingOutcome;
use crate::types::config::Config;
use crate::types::context::MaskingContext;
use crate::{SigiloError, SigiloResult};

/// Composer de resultados.
///
/// Recebe cache e motor já construídos; clones compartilham ambos.
#[derive(Clone, Debug)]
pub struct Composer {
    cache: SharedCache<Value>,
    engine: MaskingEngine,
    hooks: Arc<HookSystem>,
    default_ttl: Duration,
    cache_enabled: bool,
}

impl Composer {
    /// Cria um novo composer.
    pub fn new(cache: SharedCache<Value>, engine: MaskingEngine, default_ttl: Duration) -> Self {
        Self {
            cache,
            engine,
            hooks: Arc::new(HookSystem::new()),
            default_ttl,
            cache_enabled: true,
        }
    }

    /// Monta o composer a partir da configuração.
    pub fn from_config(config: &Config) -> SigiloResult<Self> {
        let engine = MaskingEngine::from_config(&config.masking)?;
        let cache = SharedCache::new(config.cache.capacity);

        let mut composer = Self::new(cache, engine, config.cache.ttl());
        composer.cache_enabled = config.cache.enabled;
        Ok(composer)
    }

    /// Define os hooks.
    pub fn with_hooks(mut self, hooks: HookSystem) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Motor de mascaramento em uso.
    pub fn engine(&self) -> &MaskingEngine {
        &self.engine
    }

    /// Cache em uso.
    pub fn cache(&self) -> &SharedCache<Value> {
        &self.cache
    }

    /// TTL padrão.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Inicia a limpeza periódica do cache.
    ///
    /// Precisa de um runtime tokio ativo.
    pub fn spawn_cleanup(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        spawn_cleanup(self.cache.clone(), interval)
    }

    /// Busca, mascara e guarda em cache com as regras registradas.
    ///
    /// `ttl = None` usa o TTL padrão. Erros da busca são devolvidos sem
    /// alteração e nada é gravado no cache.
    pub async fn compose<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        context: &MaskingContext,
        fetch: F,
    ) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
        E: From<SigiloError>,
    {
        let scoped = scoped_key(key, context);
        if let Some(cached) = self.lookup(&scoped, context).await {
            return Ok(cached);
        }

        let fetched = fetch().await?;
        let outcome = self.engine.mask(&fetched, context)?;

        Ok(self.store(&scoped, ttl, context, outcome).await)
    }

    /// Igual a [`compose`](Self::compose), com um conjunto de regras
    /// específico. A entrada no cache é separada por conjunto de regras.
    pub async fn compose_with_rules<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        context: &MaskingContext,
        fetch: F,
        rules: &RuleRegistry,
    ) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
        E: From<SigiloError>,
    {
        // Regras diferentes produzem saídas diferentes: entram no escopo
        let scoped = format!("{}#{}", scoped_key(key, context), rules.fingerprint());
        if let Some(cached) = self.lookup(&scoped, context).await {
            return Ok(cached);
        }

        let fetched = fetch().await?;
        let outcome = self.engine.mask_with_rules(&fetched, context, rules);

        Ok(self.store(&scoped, ttl, context, outcome).await)
    }

    /// Remove entradas cuja chave contém o padrão (todas se `None`).
    pub fn invalidate(&self, pattern: Option<&str>) -> usize {
        let removed = self.cache.clear(pattern);
        tracing::debug!(pattern = ?pattern, removed, "Cache invalidated");
        removed
    }

    /// Estatísticas do cache.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn lookup(&self, scoped: &str, context: &MaskingContext) -> Option<Value> {
        if !self.cache_enabled {
            return None;
        }

        match self.cache.get(scoped) {
            Some(value) => {
                tracing::debug!(key = %scoped, "Composer cache hit");
                self.hooks.run_cache_hit(scoped, context).await;
                Some(value)
            }
            None => {
                tracing::debug!(key = %scoped, "Composer cache miss");
                self.hooks.run_cache_miss(scoped, context).await;
                None
            }
        }
    }

    async fn store(
        &self,
        scoped: &str,
        ttl: Option<Duration>,
        context: &MaskingContext,
        outcome: MaskingOutcome,
    ) -> Value {
        self.hooks.run_masked(scoped, context, &outcome.audit).await;

        // Resultados vazios também vão para o cache
        if self.cache_enabled {
            self.cache.set(
                scoped.to_string(),
                outcome.data.clone(),
                ttl.unwrap_or(self.default_ttl),
            );
        }

        outcome.data
    }
}

/// Chave com escopo do contexto: o mesmo dado mascarado para papéis
/// diferentes não pode dividir a entrada.
fn scoped_key(key: &str, context: &MaskingContext) -> String {
    format!("{}#{}", key, context.fingerprint())
}
