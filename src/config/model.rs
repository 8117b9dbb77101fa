//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for agentlock.
///
/// This struct represents the contents of `<state root>/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lease settings
    // =========================================================================
    /// Seconds a newly created lease stays live.
    #[serde(default = "default_lease_duration_secs")]
    pub lease_duration_secs: u64,

    /// Create lock records with an exclusive-create primitive.
    ///
    /// When false, acquisition reads the record and then overwrites it,
    /// which lets two first-time acquirers both succeed.
    #[serde(default = "default_true")]
    pub exclusive_create: bool,

    // =========================================================================
    // Storage layout
    // =========================================================================
    /// Lock record directory. Relative paths resolve against the state root.
    #[serde(default = "default_lock_dir")]
    pub lock_dir: String,

    /// Activity journal directory. Relative paths resolve against the state root.
    #[serde(default = "default_activity_dir")]
    pub activity_dir: String,

    // =========================================================================
    // Gatekeeper settings
    // =========================================================================
    /// Glob patterns for resource paths that bypass locking entirely.
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lease_duration_secs: default_lease_duration_secs(),
            exclusive_create: default_true(),
            lock_dir: default_lock_dir(),
            activity_dir: default_activity_dir(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}
