//! Config loading, validation, and utility operations.

use super::model::Config;
use super::types::{MAX_LEASE_DURATION_SECS, lease_duration_from_secs};
use crate::error::{AgentLockError, Result};
use chrono::Duration;
use globset::Glob;
use std::path::Path;
use tracing::debug;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(AgentLockError::UserError)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            AgentLockError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from a YAML file, falling back to defaults when the file
    /// does not exist. A file that exists but is invalid is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| AgentLockError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            AgentLockError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `lease_duration_secs` must be positive and at most one week
    /// - `lock_dir` and `activity_dir` must be non-empty
    /// - `exclude_patterns` entries must be non-empty, valid globs
    pub fn validate(&self) -> Result<()> {
        if self.lease_duration_secs == 0 {
            return Err(AgentLockError::UserError(
                "config validation failed: lease_duration_secs must be greater than 0".to_string(),
            ));
        }
        if self.lease_duration_secs > MAX_LEASE_DURATION_SECS {
            return Err(AgentLockError::UserError(format!(
                "config validation failed: lease_duration_secs must be at most {} (got {})",
                MAX_LEASE_DURATION_SECS, self.lease_duration_secs
            )));
        }

        if self.lock_dir.trim().is_empty() {
            return Err(AgentLockError::UserError(
                "config validation failed: lock_dir must be non-empty".to_string(),
            ));
        }
        if self.activity_dir.trim().is_empty() {
            return Err(AgentLockError::UserError(
                "config validation failed: activity_dir must be non-empty".to_string(),
            ));
        }

        for pattern in &self.exclude_patterns {
            if pattern.trim().is_empty() {
                return Err(AgentLockError::UserError(
                    "config validation failed: exclude_patterns entries must be non-empty"
                        .to_string(),
                ));
            }
            Glob::new(pattern).map_err(|e| {
                AgentLockError::UserError(format!(
                    "config validation failed: invalid exclude pattern '{}': {}",
                    pattern, e
                ))
            })?;
        }

        Ok(())
    }

    /// The configured lease length as a chrono duration.
    pub fn lease_duration(&self) -> Duration {
        lease_duration_from_secs(self.lease_duration_secs)
    }
}
