//! Configuration for Sigilo.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::rules::{MaskingRule, RuleDefinition};
use crate::SigiloResult;

/// Main configuration for Sigilo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Query cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Masking engine settings.
    #[serde(default)]
    pub masking: MaskingConfig,

    /// Audit trail settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

/// Query cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of entries (0 = unbounded).
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Default entry time to live in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Interval of the background sweep in seconds (0 = disabled).
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl CacheConfig {
    /// Default TTL as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Sweep interval, if enabled.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval_secs > 0).then(|| Duration::from_secs(self.cleanup_interval_secs))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

fn default_cleanup_interval() -> u64 {
    600
}

/// Masking engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskingConfig {
    /// Placeholder used by `full` masking.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Marker used by `redact` masking.
    #[serde(default = "default_redaction_marker")]
    pub redaction_marker: String,

    /// Salt mixed into `hash` digests.
    #[serde(default)]
    pub hash_salt: String,

    /// Secret mixed into `tokenize` surrogates.
    #[serde(default)]
    pub token_secret: String,

    /// Values shorter than this fall back from `partial` to `full`.
    #[serde(default = "default_partial_min_length")]
    pub partial_min_length: usize,

    /// Registers the built-in LGPD rule set.
    #[serde(default = "default_true")]
    pub include_builtin_rules: bool,

    /// Extra rules.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            redaction_marker: default_redaction_marker(),
            hash_salt: String::new(),
            token_secret: String::new(),
            partial_min_length: default_partial_min_length(),
            include_builtin_rules: true,
            rules: Vec::new(),
        }
    }
}

impl MaskingConfig {
    /// Validates the configured rules, failing on the first invalid one.
    pub fn validated_rules(&self) -> SigiloResult<Vec<MaskingRule>> {
        self.rules.iter().map(MaskingRule::try_from).collect()
    }
}

fn default_placeholder() -> String {
    "***".to_string()
}

fn default_redaction_marker() -> String {
    "[REDACTED]".to_string()
}

fn default_partial_min_length() -> usize {
    5
}

/// Audit trail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// SQLite database path.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".sigilo/audit.db")
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> SigiloResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> SigiloResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Tries to load configuration from current directory or uses default.
    pub fn load_or_default() -> Self {
        Self::load("sigilo.toml").unwrap_or_else(|_| Self::default_config())
    }
}
