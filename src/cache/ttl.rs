//! Cache com TTL por entrada.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;

use super::clock::{Clock, SystemClock};

/// Entrada do cache.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Valor armazenado (opaco para o cache).
    pub value: V,

    /// Momento da inserção.
    pub inserted_at: DateTime<Utc>,

    /// Tempo de vida da entrada.
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Verifica se a entrada expirou em `now`.
    ///
    /// Visível apenas enquanto `now - inserted_at < ttl`. Se o relógio
    /// voltar no tempo, a entrada é considerada expirada.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now
            .signed_duration_since(self.inserted_at)
            .to_std()
            .unwrap_or(Duration::MAX);
        elapsed >= self.ttl
    }
}

/// Estatísticas do cache.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Número atual de entradas (inclui expiradas ainda não removidas).
    pub size: usize,

    /// Capacidade máxima (`None` = sem limite).
    pub capacity: Option<usize>,

    /// Número de acertos (cache hits).
    pub hits: u64,

    /// Número de erros (cache misses).
    pub misses: u64,
}

impl CacheStats {
    /// Calcula a taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache chave→valor com expiração.
///
/// Com capacidade definida, a entrada menos usada recentemente é
/// descartada para abrir espaço. Com capacidade 0 o cache não tem limite.
pub struct TtlCache<V> {
    entries: LruCache<String, CacheEntry<V>>,
    clock: Arc<dyn Clock>,
    bounded: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> TtlCache<V> {
    /// Cria um novo cache com o relógio do sistema.
    ///
    /// # Argumentos
    /// - `capacity`: Número máximo de entradas (0 = sem limite)
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    /// Cria um cache com um relógio específico.
    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let (entries, bounded) = match NonZeroUsize::new(capacity) {
            Some(cap) => (LruCache::new(cap), true),
            None => (LruCache::unbounded(), false),
        };

        Self {
            entries,
            clock,
            bounded,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Busca no cache.
    ///
    /// Retorna `None` se não encontrado ou se expirado.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let now = self.clock.now();
        let is_expired = self.entries.peek(key).map(|e| e.is_expired(now));

        match is_expired {
            Some(true) => {
                self.entries.pop(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key, "cache entry expired");
                None
            }
            Some(false) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.entries.get(key).map(|e| &e.value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insere ou sobrescreve uma entrada, reiniciando o TTL.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            inserted_at: self.clock.now(),
            ttl,
        };

        let key = key.into();
        if self.entries.contains(key.as_str()) {
            self.entries.put(key, entry);
        } else if let Some((evicted, _)) = self.entries.push(key, entry) {
            tracing::debug!(key = %evicted, "cache full, evicted least recently used entry");
        }
    }

    /// Verifica se existe entrada válida, sem contar hit/miss.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .peek(key)
            .map(|e| !e.is_expired(now))
            .unwrap_or(false)
    }

    /// Invalida uma entrada específica.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.pop(key).is_some()
    }

    /// Remove todas as entradas, ou só as que contêm `pattern` na chave.
    ///
    /// Retorna quantas entradas foram removidas.
    pub fn clear(&mut self, pattern: Option<&str>) -> usize {
        match pattern {
            None => {
                let removed = self.entries.len();
                self.entries.clear();
                removed
            }
            Some(pattern) => {
                let matching: Vec<String> = self
                    .entries
                    .iter()
                    .filter(|(k, _)| k.contains(pattern))
                    .map(|(k, _)| k.clone())
                    .collect();

                for key in &matching {
                    self.entries.pop(key);
                }
                matching.len()
            }
        }
    }

    /// Remove entradas expiradas.
    ///
    /// Retorna quantas entradas foram removidas.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now();

        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, v)| v.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &expired_keys {
            self.entries.pop(key);
        }
        expired_keys.len()
    }

    /// Número de entradas armazenadas (inclui expiradas ainda não removidas).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Se o cache está vazio.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retorna estatísticas do cache.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            capacity: self.bounded.then(|| self.entries.cap().get()),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
