//! YAML configuration for the analysis pipeline.
//!
//! One file describes how submissions are normalized, how the TF-IDF
//! vocabulary is capped and where the blacklist lives. Every section is
//! optional; missing sections fall back to the library defaults. The
//! blacklist defaults to a redb file in the working directory
//! ([`DEFAULT_BLACKLIST_PATH`]); `in_memory` must be asked for.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "course-2026"
//!
//! normalizer:
//!   version: 1
//!   normalize_unicode: true
//!   alphabet: "french"        # or "unicode"
//!   remove_stop_words: false
//!
//! scoring:
//!   max_features: 1000        # null for an unlimited vocabulary
//!
//! blacklist:
//!   backend: "redb"           # or "in_memory"
//!   path: "/var/lib/plagiat/blacklist.redb"
//!   threshold: 80.0
//! ```

use std::fs;
use std::path::Path;

use blacklist::BackendConfig;
use canonical::{Alphabet, NormalizeConfig};
use matcher::EngineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DEFAULT_BLACKLIST_THRESHOLD;

/// Blacklist database file used when the config names none.
pub const DEFAULT_BLACKLIST_PATH: &str = "plagiat-blacklist.redb";

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Top-level YAML configuration for the whole pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PlagiatConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub normalizer: NormalizerYamlConfig,

    #[serde(default)]
    pub scoring: ScoringYamlConfig,

    #[serde(default)]
    pub blacklist: BlacklistYamlConfig,
}

impl PlagiatConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PlagiatConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.normalizer.validate()?;
        self.scoring.validate()?;
        self.blacklist.validate()?;

        Ok(())
    }

    pub fn normalize_config(&self) -> NormalizeConfig {
        self.normalizer.to_normalize_config()
    }

    pub fn engine_config(&self) -> EngineConfig {
        self.scoring.to_engine_config()
    }

    pub fn backend_config(&self) -> Result<BackendConfig, ConfigLoadError> {
        self.blacklist.to_backend_config()
    }
}

impl Default for PlagiatConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            normalizer: NormalizerYamlConfig::default(),
            scoring: ScoringYamlConfig::default(),
            blacklist: BlacklistYamlConfig::default(),
        }
    }
}

/// Normalizer YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "true_value")]
    pub normalize_unicode: bool,

    #[serde(default)]
    pub alphabet: Alphabet,

    #[serde(default)]
    pub remove_stop_words: bool,
}

impl NormalizerYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "normalizer.version must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_normalize_config(&self) -> NormalizeConfig {
        NormalizeConfig {
            version: self.version,
            normalize_unicode: self.normalize_unicode,
            alphabet: self.alphabet,
            remove_stop_words: self.remove_stop_words,
        }
    }
}

impl Default for NormalizerYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: true,
            alphabet: Alphabet::French,
            remove_stop_words: false,
        }
    }
}

/// Scoring YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringYamlConfig {
    #[serde(default = "default_max_features")]
    pub max_features: Option<usize>,
}

impl ScoringYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        self.to_engine_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("scoring: {e}")))
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_features: self.max_features,
        }
    }
}

impl Default for ScoringYamlConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
        }
    }
}

/// Blacklist YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistYamlConfig {
    /// `redb` (default) or `in_memory`
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Database file for `redb`. Defaults to [`DEFAULT_BLACKLIST_PATH`];
    /// an explicit `null` or blank path is rejected.
    #[serde(default = "default_blacklist_path")]
    pub path: Option<String>,

    /// Percentage at or above which a submitter is blacklisted.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl BlacklistYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if !(self.threshold.is_finite() && (0.0..=100.0).contains(&self.threshold)) {
            return Err(ConfigLoadError::Validation(
                "blacklist.threshold must be between 0 and 100".to_string(),
            ));
        }
        self.to_backend_config().map(|_| ())
    }

    pub fn to_backend_config(&self) -> Result<BackendConfig, ConfigLoadError> {
        match self.backend.as_str() {
            "in_memory" | "memory" => Ok(BackendConfig::InMemory),
            "redb" => match self.path.as_deref().map(str::trim) {
                Some(path) if !path.is_empty() => Ok(BackendConfig::redb(path)),
                _ => Err(ConfigLoadError::MissingField("blacklist.path".to_string())),
            },
            other => Err(ConfigLoadError::Validation(format!(
                "blacklist.backend must be one of in_memory, redb (got {other:?})"
            ))),
        }
    }
}

impl Default for BlacklistYamlConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_blacklist_path(),
            threshold: default_threshold(),
        }
    }
}

fn default_version() -> u32 {
    1
}

fn true_value() -> bool {
    true
}

fn default_max_features() -> Option<usize> {
    EngineConfig::default().max_features
}

fn default_backend() -> String {
    "redb".to_string()
}

fn default_blacklist_path() -> Option<String> {
    Some(DEFAULT_BLACKLIST_PATH.to_string())
}

fn default_threshold() -> f64 {
    DEFAULT_BLACKLIST_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
normalizer:
  version: 1
  alphabet: "unicode"
  remove_stop_words: true
"#;

        let config = PlagiatConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.normalizer.alphabet, Alphabet::Unicode);
        assert!(config.normalize_config().remove_stop_words);
        assert!(config.normalize_config().normalize_unicode);
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1.0"
blacklist:
  backend: "in_memory"
  threshold: 75.5
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = PlagiatConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.blacklist.threshold, 75.5);
        assert_eq!(config.backend_config().unwrap(), BackendConfig::InMemory);
    }

    #[test]
    fn test_default_config() {
        let config = PlagiatConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.name.is_none());
        assert_eq!(config.normalize_config(), NormalizeConfig::default());
        assert_eq!(config.engine_config(), EngineConfig::default());
        assert_eq!(config.blacklist.threshold, 80.0);
        assert_eq!(
            config.backend_config().unwrap(),
            BackendConfig::redb(DEFAULT_BLACKLIST_PATH)
        );
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config = PlagiatConfig::from_yaml("version: \"1\"\n").unwrap();
        assert_eq!(config.scoring.max_features, Some(1000));
        assert_eq!(config.blacklist.backend, "redb");
        assert_eq!(
            config.backend_config().unwrap(),
            BackendConfig::redb(DEFAULT_BLACKLIST_PATH)
        );
        assert!(!config.normalizer.remove_stop_words);
    }

    #[test]
    fn test_unsupported_version() {
        let result = PlagiatConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(result, Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2.0"));
    }

    #[test]
    fn test_redb_requires_path() {
        let yaml = r#"
version: "1.0"
blacklist:
  backend: "redb"
  path: null
"#;
        let result = PlagiatConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigLoadError::MissingField(f)) if f == "blacklist.path"));
    }

    #[test]
    fn test_threshold_range_validated() {
        let yaml = r#"
version: "1.0"
blacklist:
  threshold: 150
"#;
        let result = PlagiatConfig::from_yaml(yaml);
        assert!(result.unwrap_err().to_string().contains("threshold"));
    }

    #[test]
    fn test_zero_max_features_rejected() {
        let yaml = r#"
version: "1.0"
scoring:
  max_features: 0
"#;
        let result = PlagiatConfig::from_yaml(yaml);
        assert!(result.unwrap_err().to_string().contains("max_features"));
    }

    #[test]
    fn test_full_yaml_roundtrip() {
        let yaml = r#"
version: "1.0"
name: "production"
normalizer:
  version: 2
  normalize_unicode: false
  alphabet: "french"
  remove_stop_words: false
scoring:
  max_features: null
blacklist:
  backend: "redb"
  path: "/tmp/plagiat-blacklist.redb"
  threshold: 90
"#;

        let config = PlagiatConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.normalize_config().version, 2);
        assert!(!config.normalize_config().normalize_unicode);
        assert_eq!(config.engine_config().max_features, None);
        assert_eq!(
            config.backend_config().unwrap(),
            BackendConfig::redb("/tmp/plagiat-blacklist.redb")
        );
        assert_eq!(config.blacklist.threshold, 90.0);

        let rendered = serde_yaml::to_string(&config).unwrap();
        let back = PlagiatConfig::from_yaml(&rendered).unwrap();
        assert_eq!(back.engine_config(), config.engine_config());
        assert_eq!(back.normalize_config(), config.normalize_config());
    }
}
