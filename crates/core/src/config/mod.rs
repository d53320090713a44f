//! Runtime settings for the cache location, the target site and the fetch
//! throttle.
//!
//! Values come from built-in defaults, then an optional TOML file named by
//! `CAMDICT_CONFIG_FILE`, then `CAMDICT_*` environment variables. Later
//! layers win. Everything is checked by [`AppConfig::validate`] once merged.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Settings shared by the cache, the fetcher and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite file holding cached pages.
    ///
    /// Set via CAMDICT_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Scheme and host of the dictionary site.
    ///
    /// Set via CAMDICT_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Lower bound of the cooldown slept before each fetch, in milliseconds.
    ///
    /// Set via CAMDICT_COOLDOWN_MIN_MS environment variable.
    #[serde(default = "default_cooldown_min_ms")]
    pub cooldown_min_ms: u64,

    /// Upper bound (inclusive) of the fetch cooldown, in milliseconds.
    ///
    /// Set via CAMDICT_COOLDOWN_MAX_MS environment variable.
    #[serde(default = "default_cooldown_max_ms")]
    pub cooldown_max_ms: u64,

    /// Attempts per fetch before giving up.
    ///
    /// Set via CAMDICT_MAX_ATTEMPTS environment variable.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-request timeout in milliseconds.
    ///
    /// Set via CAMDICT_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Largest response body accepted, in bytes.
    ///
    /// Set via CAMDICT_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Fixed User-Agent. A random browser-like one is used per fetch when unset.
    ///
    /// Set via CAMDICT_USER_AGENT environment variable.
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./camdict-cache.sqlite")
}

fn default_base_url() -> String {
    "https://dictionary.cambridge.org".into()
}

fn default_cooldown_min_ms() -> u64 {
    3_000
}

fn default_cooldown_max_ms() -> u64 {
    5_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            base_url: default_base_url(),
            cooldown_min_ms: default_cooldown_min_ms(),
            cooldown_max_ms: default_cooldown_max_ms(),
            max_attempts: default_max_attempts(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            user_agent: None,
        }
    }
}

impl AppConfig {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cooldown bounds as an inclusive Duration range.
    pub fn cooldown(&self) -> RangeInclusive<Duration> {
        Duration::from_millis(self.cooldown_min_ms)..=Duration::from_millis(self.cooldown_max_ms)
    }

    /// Merge defaults, the optional TOML file and `CAMDICT_*` variables,
    /// then validate.
    ///
    /// A file or variable that does not deserialize is
    /// [`ConfigError::LoadFailed`]; a value out of range is
    /// [`ConfigError::Invalid`].
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CAMDICT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CAMDICT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
