//! Range checks on merged `AppConfig` values.

use crate::config::AppConfig;
use thiserror::Error;

/// Why a configuration could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cooldown_min_ms` is greater than `cooldown_max_ms`
    /// - `cooldown_max_ms` exceeds one minute
    /// - `max_attempts` is 0 or greater than 10
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_bytes` is 0
    /// - `base_url` is not an http(s) URL
    /// - `user_agent` is set but empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cooldown_min_ms > self.cooldown_max_ms {
            return Err(ConfigError::Invalid {
                field: "cooldown_min_ms".into(),
                reason: "must not exceed cooldown_max_ms".into(),
            });
        }
        if self.cooldown_max_ms > 60_000 {
            return Err(ConfigError::Invalid {
                field: "cooldown_max_ms".into(),
                reason: "must not exceed 1 minute (60000ms)".into(),
            });
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid { field: "max_attempts".into(), reason: "must be at least 1".into() });
        }
        if self.max_attempts > 10 {
            return Err(ConfigError::Invalid { field: "max_attempts".into(), reason: "must not exceed 10".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be at least 1 byte".into() });
        }

        match url::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Invalid {
                    field: "base_url".into(),
                    reason: format!("unsupported scheme: {}", url.scheme()),
                });
            }
            Err(e) => return Err(ConfigError::Invalid { field: "base_url".into(), reason: e.to_string() }),
        }

        if self.user_agent.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.cooldown_max_ms == 0 {
            tracing::warn!("fetch cooldown disabled; requests to the dictionary will not be throttled");
        }

        Ok(())
    }
}
