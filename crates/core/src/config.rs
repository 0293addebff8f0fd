// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration
//!
//! Loaded from TOML; every field has a default so an empty file (or no
//! file at all) yields [`EngineConfig::default`].
//!
//! ```toml
//! [rollup]
//! weighting = "equal"
//! progress_threshold = 1.0
//! cost_threshold_mode = "absolute"
//! cost_threshold = 500.0
//!
//! [health]
//! good_threshold = 0.95
//! warning_threshold = 0.85
//!
//! [engine]
//! operation_timeout = "5s"
//! variance_on_rollup = true
//! ```

use crate::rollup::RollupPolicy;
use crate::variance::HealthPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Execution limits for engine operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Upper bound on waiting for a project or baseline lock
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Duration,
    /// Recompute variance against every active baseline after a
    /// significant rollup
    pub variance_on_rollup: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(5),
            variance_on_rollup: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rollup: RollupPolicy,
    pub health: HealthPolicy,
    pub engine: EngineSettings,
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_required(path)
    }

    /// Load from a file that must exist
    pub fn load_required(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rollup
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.health
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.engine.operation_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "engine.operation_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
