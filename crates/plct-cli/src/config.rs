//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use plct_extractor::ExtractorConfig;
use plct_gatekeeper::ValidationConfig;
use plct_pipeline::{PipelineConfig, PipelineSettings, ReconcilerConfig};
use plct_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Effective configuration: one TOML file with a section per component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Reasoning engine provider
    pub engine: EngineSettings,

    /// Engine call policy
    pub extractor: ExtractorConfig,

    /// Validation rules
    pub validation: ValidationConfig,

    /// Dedup and sector overrides
    pub reconciler: ReconcilerConfig,

    /// Worker pool and resume settings
    pub pipeline: PipelineConfig,

    /// Record store
    pub store: StoreConfig,

    /// Output settings
    pub output: Settings,
}

/// Reasoning engine provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Gemini (needs an API key)
    #[default]
    Gemini,
    /// Local Ollama server
    Ollama,
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Which provider to call
    pub provider: Provider,

    /// Model name; the provider default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// API endpoint; the provider default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Sampling temperature (Gemini)
    pub temperature: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: None,
            endpoint: None,
            temperature: 0.1,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable colored output
    pub color: bool,

    /// Default output format
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl AppConfig {
    /// Get the default configuration file path (`~/.plct/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".plct").join("config.toml"))
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present, and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Ok(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("extractor", self.extractor.validate()),
            ("validation", self.validation.validate()),
            ("reconciler", self.reconciler.validate()),
            ("pipeline", self.pipeline.validate()),
        ];
        for (section, check) in checks {
            check.map_err(|e| CliError::Config(format!("[{}] {}", section, e)))?;
        }
        if !(0.0..=2.0).contains(&self.engine.temperature) {
            return Err(CliError::Config("[engine] temperature must be within 0.0-2.0".into()));
        }
        Ok(())
    }

    /// Pipeline settings for a run.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            pipeline: self.pipeline.clone(),
            extractor: self.extractor.clone(),
            validation: self.validation.clone(),
            scoring: Default::default(),
            reconciler: self.reconciler.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plct_pipeline::DedupPolicy;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.provider, Provider::Gemini);
        assert_eq!(config.pipeline.workers, 3);
        assert!(config.output.color);
    }

    #[test]
    fn test_round_trip() {
        let mut config = AppConfig::default();
        config.engine.model = Some("gemini-1.5-pro".to_string());
        config.pipeline.workers = 5;
        let parsed = AppConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_file() {
        let config = AppConfig::from_toml(
            r#"
            [engine]
            provider = "ollama"
            model = "llama3.1"

            [reconciler]
            dedup = { mode = "fuzzy", threshold = 0.9 }

            [store]
            path = "/var/lib/plct/records.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.provider, Provider::Ollama);
        assert_eq!(config.reconciler.dedup, DedupPolicy::Fuzzy { threshold: 0.9 });
        assert_eq!(config.store.path, PathBuf::from("/var/lib/plct/records.db"));
        assert_eq!(config.extractor.max_attempts, 3);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plct.toml");
        fs::write(&path, "[pipeline]\nworkers = 2\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.pipeline.workers, 2);

        assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_invalid_section_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plct.toml");
        fs::write(&path, "[pipeline]\nworkers = 0\n").unwrap();

        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("[pipeline]"));
    }
}
