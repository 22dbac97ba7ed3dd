//! Relógio injetável para o cache.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Fonte de tempo do cache.
pub trait Clock: Send + Sync {
    /// Momento atual.
    fn now(&self) -> DateTime<Utc>;
}

/// Relógio do sistema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Relógio controlado manualmente, para testes determinísticos.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Cria um relógio parado no momento dado.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Avança o relógio.
    pub fn advance(&self, by: Duration) {
        let delta = chrono::Duration::from_std(by)
            .unwrap_or_else(|_| chrono::Duration::weeks(52 * 100));
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = now.checked_add_signed(delta).unwrap_or(*now);
    }

    /// Define o momento atual.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
