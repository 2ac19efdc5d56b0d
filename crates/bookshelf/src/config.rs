use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use bookshelf_core::cache::{TtlPolicy, DEFAULT_TTL_BASE, DEFAULT_TTL_JITTER, MAX_TTL};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or watching settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("Failed to watch config file: {0}")]
    Watch(#[from] notify::Error),
}

/// Application settings.
///
/// Built from defaults, then an optional TOML file, then environment
/// variables. A value is never mutated once a snapshot is published.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub store: StoreSettings,
    pub cache: CacheSettings,
}

/// Durable store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSettings {
    /// Path to SQLite database file (default: "bookshelf.db")
    pub sqlite_path: String,
    /// How long SQLite waits on a locked database, in milliseconds (default: 5,000)
    pub busy_timeout_ms: u64,
}

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings {
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    pub redis_url: String,
    /// Maximum number of in-memory cache entries (default: 10,000)
    pub max_entries: usize,
    /// Base TTL in seconds (default: 7,200)
    pub ttl_base_secs: u64,
    /// Exclusive upper bound of the random TTL extension in seconds (default: 600)
    pub ttl_jitter_secs: u64,
    /// Upper bound for a single cache call in milliseconds (default: 500)
    pub op_timeout_ms: u64,
    /// Prefix prepended to book names to form cache keys (default: "")
    pub key_prefix: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            sqlite_path: "bookshelf.db".to_string(),
            busy_timeout_ms: 5_000,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            max_entries: 10_000,
            ttl_base_secs: DEFAULT_TTL_BASE.as_secs(),
            ttl_jitter_secs: DEFAULT_TTL_JITTER.as_secs(),
            op_timeout_ms: 500,
            key_prefix: String::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreSettings::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings: defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| env::var(key).ok())
    }

    /// Like [`Settings::load`], reading overrides through `lookup`.
    ///
    /// Validation runs once, on the merged result, so an override may
    /// replace a file value that would be rejected on its own.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match path {
            Some(path) => Self::read_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(lookup)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse and validate a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = Self::read_file(path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Environment variables:
    /// - `SQLITE_PATH` - SQLite database path
    /// - `REDIS_URL` - Redis connection URL
    /// - `CACHE_MAX_ENTRIES` - Maximum in-memory cache entries
    /// - `CACHE_TTL_SECONDS` - Base cache TTL in seconds
    /// - `CACHE_TTL_JITTER_SECONDS` - TTL jitter window in seconds
    /// - `CACHE_TIMEOUT_MS` - Cache call timeout in milliseconds
    /// - `CACHE_KEY_PREFIX` - Cache key prefix
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("SQLITE_PATH") {
            self.store.sqlite_path = path;
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.cache.redis_url = url;
        }
        if let Some(value) = lookup("CACHE_MAX_ENTRIES") {
            self.cache.max_entries = parse_number("CACHE_MAX_ENTRIES", &value)?;
        }
        if let Some(value) = lookup("CACHE_TTL_SECONDS") {
            self.cache.ttl_base_secs = parse_number("CACHE_TTL_SECONDS", &value)?;
        }
        if let Some(value) = lookup("CACHE_TTL_JITTER_SECONDS") {
            self.cache.ttl_jitter_secs = parse_number("CACHE_TTL_JITTER_SECONDS", &value)?;
        }
        if let Some(value) = lookup("CACHE_TIMEOUT_MS") {
            self.cache.op_timeout_ms = parse_number("CACHE_TIMEOUT_MS", &value)?;
        }
        if let Some(prefix) = lookup("CACHE_KEY_PREFIX") {
            self.cache.key_prefix = prefix;
        }
        Ok(())
    }

    /// Reject values the service can not run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_base_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "cache.ttl_base_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.cache.ttl_base_secs > MAX_TTL.as_secs() {
            return Err(ConfigError::Invalid {
                key: "cache.ttl_base_secs",
                reason: format!("must be at most {} seconds", MAX_TTL.as_secs()),
            });
        }
        if self.cache.ttl_jitter_secs > MAX_TTL.as_secs() {
            return Err(ConfigError::Invalid {
                key: "cache.ttl_jitter_secs",
                reason: format!("must be at most {} seconds", MAX_TTL.as_secs()),
            });
        }
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid {
                key: "cache.max_entries",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.cache.op_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "cache.op_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Jittered TTL policy for cache writes.
    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy::from_secs(self.cache.ttl_base_secs, self.cache.ttl_jitter_secs)
    }

    /// Upper bound for one cache call.
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache.op_timeout_ms)
    }

    /// SQLite busy timeout.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.store.busy_timeout_ms)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
