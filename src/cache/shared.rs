//! Handle compartilhado do cache e limpeza periódica.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::clock::Clock;
use super::ttl::{CacheStats, TtlCache};

/// Cache compartilhável entre tarefas.
///
/// Operações nunca falham: se o lock estiver envenenado, uma leitura
/// vira miss e uma escrita vira no-op.
pub struct SharedCache<V> {
    inner: Arc<Mutex<TtlCache<V>>>,
}

impl<V> Clone for SharedCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> std::fmt::Debug for SharedCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCache").finish_non_exhaustive()
    }
}

impl<V: Clone> SharedCache<V> {
    /// Cria um cache compartilhado com o relógio do sistema.
    pub fn new(capacity: usize) -> Self {
        Self::from_cache(TtlCache::new(capacity))
    }

    /// Cria um cache compartilhado com um relógio específico.
    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self::from_cache(TtlCache::with_clock(capacity, clock))
    }

    /// Embrulha um cache existente.
    pub fn from_cache(cache: TtlCache<V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    fn lock(&self) -> Option<MutexGuard<'_, TtlCache<V>>> {
        match self.inner.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                tracing::warn!("cache lock poisoned, treating operation as a miss");
                None
            }
        }
    }

    /// Busca uma cópia do valor, se presente e válido.
    pub fn get(&self, key: &str) -> Option<V> {
        self.lock().and_then(|mut cache| cache.get(key).cloned())
    }

    /// Insere ou sobrescreve uma entrada.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        if let Some(mut cache) = self.lock() {
            cache.set(key, value, ttl);
        }
    }

    /// Remove todas as entradas, ou só as que contêm `pattern`.
    pub fn clear(&self, pattern: Option<&str>) -> usize {
        self.lock().map(|mut cache| cache.clear(pattern)).unwrap_or(0)
    }

    /// Invalida uma entrada específica.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock()
            .map(|mut cache| cache.invalidate(key))
            .unwrap_or(false)
    }

    /// Remove entradas expiradas.
    pub fn cleanup_expired(&self) -> usize {
        self.lock()
            .map(|mut cache| cache.cleanup_expired())
            .unwrap_or(0)
    }

    /// Retorna estatísticas do cache.
    pub fn stats(&self) -> CacheStats {
        self.lock().map(|cache| cache.stats()).unwrap_or_default()
    }
}

/// Inicia a limpeza periódica de entradas expiradas.
///
/// A varredura é O(n) sob o lock e não faz chamadas externas.
pub fn spawn_cleanup<V>(cache: SharedCache<V>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // O primeiro tick é imediato
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = cache.cleanup_expired();
            if removed > 0 {
                tracing::debug!(removed, "expired cache entries swept");
            }
        }
    })
}
