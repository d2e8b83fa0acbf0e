//! Browser Configuration
//!
//! Timing and logging knobs, read from JSON handed over by the host page.

use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrowserConfig {
    /// Readiness slot poll interval
    pub poll_interval_ms: u64,
    /// Foreground bind budget
    pub bind_timeout_ms: u64,
    /// Background rebind budget, strictly longer than the foreground one
    pub background_bind_timeout_ms: u64,
    /// DOM event the host dispatches on `document` once the backend is up
    pub ready_event: String,
    pub log_level: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            bind_timeout_ms: 7_000,
            background_bind_timeout_ms: 15_000,
            ready_event: "backend-ready".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl BrowserConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("pollIntervalMs must be positive".into()));
        }
        if self.bind_timeout_ms == 0 {
            return Err(ConfigError::Invalid("bindTimeoutMs must be positive".into()));
        }
        if self.background_bind_timeout_ms <= self.bind_timeout_ms {
            return Err(ConfigError::Invalid(format!(
                "backgroundBindTimeoutMs ({}) must exceed bindTimeoutMs ({})",
                self.background_bind_timeout_ms, self.bind_timeout_ms
            )));
        }
        Ok(())
    }

    /// This config if it validates, otherwise the defaults
    pub fn or_default(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(err) => {
                warn!("[APP] {}, using defaults", err);
                Self::default()
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn bind_timeout(&self) -> Duration {
        Duration::from_millis(self.bind_timeout_ms)
    }

    pub fn background_bind_timeout(&self) -> Duration {
        Duration::from_millis(self.background_bind_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = BrowserConfig::from_json(r#"{"bindTimeoutMs": 3000}"#).unwrap();
        assert_eq!(config.bind_timeout(), Duration::from_secs(3));
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.background_bind_timeout_ms, 15_000);
        assert_eq!(config.ready_event, "backend-ready");
    }

    #[test]
    fn test_background_must_outlast_foreground() {
        let err = BrowserConfig::from_json(r#"{"bindTimeoutMs": 9000, "backgroundBindTimeoutMs": 9000}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        assert!(BrowserConfig::from_json(r#"{"pollIntervalMs": 0}"#).is_err());
        assert!(BrowserConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let config = BrowserConfig { bind_timeout_ms: 20_000, ..Default::default() }.or_default();
        assert_eq!(config, BrowserConfig::default());

        let custom = BrowserConfig { bind_timeout_ms: 1_000, ..Default::default() };
        assert_eq!(custom.clone().or_default(), custom);
    }
}
