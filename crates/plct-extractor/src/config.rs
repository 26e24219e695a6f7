//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Engine calls per document, including the first
    pub max_attempts: u32,

    /// Backoff before the second attempt (milliseconds); doubles each retry
    pub base_backoff_ms: u64,

    /// Upper bound on a single backoff sleep (milliseconds)
    pub max_backoff_ms: u64,

    /// Maximum time for a single engine call (seconds)
    pub request_timeout_secs: u64,

    /// Document text beyond this many characters is truncated
    pub max_document_chars: usize,

    /// Engine calls allowed per minute across all workers
    pub requests_per_minute: u32,

    /// Engine calls allowed in flight at once across all workers
    pub max_concurrent_requests: usize,
}

impl ExtractorConfig {
    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Backoff before retrying after failed attempt number `attempt` (1-based)
    ///
    /// `base · 2^(attempt-1)`, capped at `max_backoff_ms`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let ms = self
            .base_backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        if self.max_backoff_ms < self.base_backoff_ms {
            return Err("max_backoff_ms cannot be less than base_backoff_ms".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.max_document_chars == 0 {
            return Err("max_document_chars must be greater than 0".to_string());
        }
        if self.requests_per_minute == 0 {
            return Err("requests_per_minute must be greater than 0".to_string());
        }
        if self.max_concurrent_requests == 0 {
            return Err("max_concurrent_requests must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Balanced settings sized for the Gemini free tier
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 2_000,
            max_backoff_ms: 30_000,
            request_timeout_secs: 120,
            max_document_chars: 80_000,
            requests_per_minute: 15,
            max_concurrent_requests: 2,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: short timeouts and a high quota for paid tiers
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 2,
            base_backoff_ms: 1_000,
            max_backoff_ms: 10_000,
            request_timeout_secs: 60,
            max_document_chars: 80_000,
            requests_per_minute: 60,
            max_concurrent_requests: 4,
        }
    }

    /// Lenient preset: patient retries for slow or heavily limited engines
    pub fn lenient() -> Self {
        Self {
            max_attempts: 5,
            base_backoff_ms: 5_000,
            max_backoff_ms: 60_000,
            request_timeout_secs: 300,
            max_document_chars: 120_000,
            requests_per_minute: 5,
            max_concurrent_requests: 1,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
        assert!(ExtractorConfig::aggressive().validate().is_ok());
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_max_attempts() {
        let config = ExtractorConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_backoff_bounds() {
        let config = ExtractorConfig {
            base_backoff_ms: 5_000,
            max_backoff_ms: 1_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = ExtractorConfig::default();
        assert_eq!(config.backoff_for(1), Duration::from_millis(2_000));
        assert_eq!(config.backoff_for(2), Duration::from_millis(4_000));
        assert_eq!(config.backoff_for(3), Duration::from_millis(8_000));
        assert_eq!(config.backoff_for(5), Duration::from_millis(30_000));
        assert_eq!(config.backoff_for(60), Duration::from_millis(30_000));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("max_attempts = 5\n").unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.max_document_chars, 80_000);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::lenient();
        let parsed = ExtractorConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
