//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Configuration for validation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Earliest accepted report year
    pub min_report_year: u16,

    /// Latest accepted report year
    pub max_report_year: u16,

    /// Descriptions shorter than this (after trimming) reject the initiative
    pub min_description_chars: usize,

    /// Accept numeric strings such as "85" or "85%" for scores and years
    pub coerce_numeric_strings: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_report_year: 1990,
            max_report_year: 2100,
            min_description_chars: 1,
            coerce_numeric_strings: true,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (minimal validation)
    pub fn permissive() -> Self {
        Self {
            min_report_year: 1900,
            max_report_year: 2200,
            min_description_chars: 1,
            coerce_numeric_strings: true,
        }
    }

    /// Create a strict configuration
    pub fn strict() -> Self {
        Self {
            min_report_year: 2000,
            max_report_year: 2100,
            min_description_chars: 20,
            coerce_numeric_strings: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_report_year > self.max_report_year {
            return Err("min_report_year cannot exceed max_report_year".to_string());
        }
        if self.min_description_chars == 0 {
            return Err("min_description_chars must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Whether `year` lies within the configured bounds
    pub fn accepts_year(&self, year: i64) -> bool {
        (i64::from(self.min_report_year)..=i64::from(self.max_report_year)).contains(&year)
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
