//! Global configuration management
//!
//! Reads settings from `config.toml` in the config directory. Command-line
//! flags take precedence over these settings, which take precedence over the
//! built-in defaults in [`crate::config::defaults`].
//!
//! ```toml
//! [progress]
//! type = "term"
//!
//! [builder]
//! command = ["sudo", "osbuild"]
//! store = "/var/cache/image-builder/store"
//! output_directory = "/srv/images"
//! env = ["OSBUILD_EXPERIMENTAL=1"]
//! ```

use crate::config::defaults;
use crate::infra::dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for image-builder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Progress reporting settings
    #[serde(default)]
    pub progress: ProgressConfig,

    /// External builder settings
    #[serde(default)]
    pub builder: BuilderConfig,
}

/// Progress reporting settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Backend name: `plain`, `debug` or `term`
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// External builder settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Program and leading arguments used to run the builder
    pub command: Option<Vec<String>>,

    /// Object store directory
    pub store: Option<PathBuf>,

    /// Artifact output directory
    pub output_directory: Option<PathBuf>,

    /// Extra `KEY=VALUE` environment entries for the builder
    #[serde(default)]
    pub env: Vec<String>,
}

impl GlobalConfig {
    /// Load configuration from the config directory.
    ///
    /// A missing file yields the default configuration.
    pub fn load(dirs: &AppDirs) -> Result<Self, GlobalConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, GlobalConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Effective progress backend name
    #[must_use]
    pub fn progress_kind(&self) -> &str {
        self.progress
            .kind
            .as_deref()
            .unwrap_or(defaults::DEFAULT_PROGRESS)
    }

    /// Effective builder command; never empty
    #[must_use]
    pub fn builder_command(&self) -> Vec<String> {
        match &self.builder.command {
            Some(command) if !command.is_empty() => command.clone(),
            _ => vec![defaults::DEFAULT_BUILDER.to_string()],
        }
    }

    /// Effective object store directory
    #[must_use]
    pub fn store(&self) -> PathBuf {
        self.builder
            .store
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::DEFAULT_STORE))
    }

    /// Effective output directory
    #[must_use]
    pub fn output_directory(&self) -> PathBuf {
        self.builder
            .output_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::DEFAULT_OUTPUT_DIR))
    }
}
