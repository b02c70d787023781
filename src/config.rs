//! YAML configuration for the pattern lookup.
//!
//! One file selects the shard store backend and tunes the lookup. Every
//! section is optional; omitted values fall back to the defaults below.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "production"
//!
//! lookup:
//!   batch_size: 50
//!
//! store:
//!   backend: "redb"
//!   path: "/var/lib/uapatterns/patterns.redb"
//! ```

use std::fs;
use std::path::Path;

use lookup::{LookupConfig, DEFAULT_BATCH_SIZE};
use serde::{Deserialize, Serialize};
use store::StoreConfig;
use thiserror::Error;

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

/// Top-level YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct UaPatternsConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub lookup: LookupYamlConfig,

    #[serde(default)]
    pub store: StoreYamlConfig,
}

impl UaPatternsConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: UaPatternsConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.lookup.validate()?;
        self.store.validate()?;
        Ok(())
    }

    pub fn to_lookup_config(&self) -> LookupConfig {
        LookupConfig::default().with_batch_size(self.lookup.batch_size)
    }

    /// Backend selection for [`StoreConfig::build`].
    pub fn to_store_config(&self) -> Result<StoreConfig, ConfigLoadError> {
        match self.store.backend {
            StoreBackendKind::InMemory => Ok(StoreConfig::in_memory()),
            StoreBackendKind::Redb => self
                .store
                .path
                .as_deref()
                .map(StoreConfig::redb)
                .ok_or_else(|| ConfigLoadError::MissingField("store.path".to_string())),
        }
    }
}

impl Default for UaPatternsConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            lookup: LookupYamlConfig::default(),
            store: StoreYamlConfig::default(),
        }
    }
}

/// Lookup tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LookupYamlConfig {
    /// Maximum number of patterns per emitted unit.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl LookupYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.batch_size == 0 {
            return Err(ConfigLoadError::Validation(
                "lookup.batch_size must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LookupYamlConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendKind {
    #[default]
    InMemory,
    Redb,
}

/// Shard store YAML configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreYamlConfig {
    #[serde(default)]
    pub backend: StoreBackendKind,

    /// Database file; required for `redb`.
    #[serde(default)]
    pub path: Option<String>,
}

impl StoreYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.backend == StoreBackendKind::Redb && self.path.is_none() {
            return Err(ConfigLoadError::Validation(
                "store.path is required when backend is 'redb'".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
