//! Configuration for pipeline runs
//!
//! Defines worker counts, cancellation grace and reconciliation rules.

use plct_domain::Sector;
use plct_ingest::LoaderConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Configuration for a batch run
///
/// # Examples
///
/// ```
/// use plct_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.workers, 3);
/// assert!(config.skip_processed);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Documents processed in parallel
    /// Default: 3 (the request budget is the real limit on engine calls)
    pub workers: usize,

    /// How long in-flight extractions may run after cancellation (in seconds)
    /// Default: 30
    pub grace_period_secs: u64,

    /// Report documents whose fingerprint is already stored instead of re-extracting them
    /// Default: true
    pub skip_processed: bool,

    /// Minimum characters of usable text per document
    /// Default: 200
    pub min_text_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            grace_period_secs: 30,
            skip_processed: true,
            min_text_chars: plct_ingest::DEFAULT_MIN_TEXT_CHARS,
        }
    }
}

impl PipelineConfig {
    /// Maximum workers accepted by [`validate`](Self::validate)
    pub const MAX_WORKERS: usize = 64;

    /// Cancellation grace as a Duration
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    /// Loader settings derived from this configuration
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            min_text_chars: self.min_text_chars,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 || self.workers > Self::MAX_WORKERS {
            return Err(format!("workers must be between 1 and {}", Self::MAX_WORKERS));
        }
        if self.min_text_chars == 0 {
            return Err("min_text_chars must be greater than 0".to_string());
        }
        Ok(())
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

/// How initiatives of one document are judged to be duplicates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DedupPolicy {
    /// Equal after lowercasing and collapsing whitespace
    #[default]
    Exact,
    /// Normalized similarity ratio (0-1) at or above `threshold`
    Fuzzy {
        /// Minimum similarity
        threshold: f64,
    },
}

/// Configuration for the record reconciler
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Duplicate detection rule
    pub dedup: DedupPolicy,

    /// Company name to sector label, applied after validation
    ///
    /// Corrects sectors the engine gets wrong for known companies. Names are
    /// matched case-insensitively.
    pub sector_overrides: BTreeMap<String, String>,
}

impl ReconcilerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if let DedupPolicy::Fuzzy { threshold } = self.dedup {
            if !(threshold > 0.0 && threshold <= 1.0) {
                return Err("fuzzy dedup threshold must be in (0, 1]".to_string());
            }
        }
        for (company, label) in &self.sector_overrides {
            match Sector::parse(label) {
                Some(Sector::Unclassified) | None => {
                    return Err(format!("sector override for '{}' is not a known sector: {}", company, label));
                }
                Some(_) => {}
            }
        }
        Ok(())
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
