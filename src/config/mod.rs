//! Drop pipeline configuration
//!
//! Loaded from YAML. Every field has a default, so an empty file (or no
//! file at all) yields a working configuration.

use crate::ingest::SandboxRoots;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the drop coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// Bundle identifier; names the app's container under `~/Library/Containers`
    pub bundle_id: String,
    /// Overrides the container root derived from `bundle_id`
    pub container_root: Option<PathBuf>,
    /// Overrides the shared temporary directory
    pub temp_root: Option<PathBuf>,
    /// Where per-drop promise destinations are created (default `<temp>/Drops`)
    pub scratch_base: Option<PathBuf>,
    /// Maximum number of items enriched at once
    pub enrich_concurrency: usize,
    /// Upper bound on a single file promise; `null` waits forever
    pub promise_timeout_secs: Option<u64>,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            bundle_id: "desktop-drop".to_string(),
            container_root: None,
            temp_root: None,
            scratch_base: None,
            enrich_concurrency: 16,
            promise_timeout_secs: Some(300),
        }
    }
}

impl DropConfig {
    /// Default config file location (`<config dir>/desktop-drop/config.yaml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("desktop-drop").join("config.yaml"))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Load `path` if given, else the default location if it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(default) if default.is_file() => Self::load(&default),
            _ => Ok(Self::default()),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enrich_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "enrich_concurrency must be greater than 0".to_string(),
            ));
        }
        if self.promise_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "promise_timeout_secs must be greater than 0 (use null to disable)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
        self.bundle_id = bundle_id.into();
        self
    }

    pub fn with_container_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.container_root = Some(root.into());
        self
    }

    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn with_scratch_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.scratch_base = Some(base.into());
        self
    }

    /// Set the concurrency limit for per-item enrichment.
    pub fn with_enrich_concurrency(mut self, limit: usize) -> Self {
        self.enrich_concurrency = limit;
        self
    }

    pub fn with_promise_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.promise_timeout_secs = timeout.map(|t| t.as_secs().max(1));
        self
    }

    pub fn promise_timeout(&self) -> Option<Duration> {
        self.promise_timeout_secs.map(Duration::from_secs)
    }

    pub fn temp_root(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn container_root(&self) -> PathBuf {
        self.container_root.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_default()
                .join("Library/Containers")
                .join(&self.bundle_id)
        })
    }

    pub fn scratch_base(&self) -> PathBuf {
        self.scratch_base
            .clone()
            .unwrap_or_else(|| self.temp_root().join("Drops"))
    }

    /// Sandbox roots for one batch; computed once, not per item.
    pub fn sandbox_roots(&self) -> SandboxRoots {
        SandboxRoots::new(self.container_root(), self.temp_root())
    }
}
