//! Cache de consultas com TTL.
//!
//! Evita buscas repetidas ao banco dentro de uma janela curta de tempo.
//!
//! - [`TtlCache`]: armazenamento chave→valor com expiração por entrada
//! - [`SharedCache`]: handle compartilhável que nunca falha
//! - [`derive_key`]: chave determinística a partir dos parâmetros
//! - [`Clock`]: relógio injetável para testes

mod clock;
mod key;
mod shared;
mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{canonical_json, derive_key, derive_key_from_value};
pub use shared::{spawn_cleanup, SharedCache};
pub use ttl::{CacheEntry, CacheStats, TtlCache};
