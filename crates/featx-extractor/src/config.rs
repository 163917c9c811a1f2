//! Configuration for the extraction engine

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry, timeout and input limits for the extraction engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Provider attempts per file, including the first
    pub max_attempts: u32,

    /// Wait before the first retry (milliseconds)
    pub initial_backoff_ms: u64,

    /// Upper bound on any single wait (milliseconds)
    pub max_backoff_ms: u64,

    /// Outer timeout around each provider call (seconds)
    pub attempt_timeout_secs: u64,

    /// Retries allowed after invalid replies, per file (0 disables them)
    pub max_invalid_responses: u32,

    /// Maximum input text length (characters)
    pub max_text_length: usize,
}

impl ExtractorConfig {
    /// Wait before the first retry
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Upper bound on any single wait
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Outer per-attempt timeout
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Wait after the given failed attempt (1-based)
    ///
    /// `min(initial_backoff * 2^(attempt-1), max_backoff)`
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_attempts == 0 {
            return Err(ExtractorError::Config("max_attempts must be at least 1".to_string()));
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err(ExtractorError::Config(
                "max_backoff_ms cannot be less than initial_backoff_ms".to_string(),
            ));
        }
        if self.attempt_timeout_secs == 0 {
            return Err(ExtractorError::Config(
                "attempt_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_text_length == 0 {
            return Err(ExtractorError::Config(
                "max_text_length must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str).map_err(|e| ExtractorError::Toml(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Toml(format!("Failed to serialize to TOML: {}", e)))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 2_000,
            max_backoff_ms: 30_000,
            attempt_timeout_secs: 120,
            max_invalid_responses: 2,
            max_text_length: 100_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_backoff(), Duration::from_secs(2));
        assert_eq!(config.attempt_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = ExtractorConfig::default();
        assert_eq!(config.backoff_for(1), Duration::from_secs(2));
        assert_eq!(config.backoff_for(2), Duration::from_secs(4));
        assert_eq!(config.backoff_for(4), Duration::from_secs(16));
        assert_eq!(config.backoff_for(5), Duration::from_secs(30));
        assert_eq!(config.backoff_for(64), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_max_attempts() {
        let config = ExtractorConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_invalid_backoff_range() {
        let config = ExtractorConfig {
            initial_backoff_ms: 5_000,
            max_backoff_ms: 1_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("max_attempts = 5").unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.max_backoff_ms, 30_000);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig {
            max_text_length: 10,
            ..Default::default()
        };
        let toml_str = config.to_toml().unwrap();
        assert_eq!(ExtractorConfig::from_toml(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            ExtractorConfig::from_toml("max_attempts = \"many\""),
            Err(ExtractorError::Toml(_))
        ));
    }
}
