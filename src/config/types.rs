//! Configuration constants and default value functions.

/// Default lease length: long enough for a multi-step edit, short enough to
/// bound how long a crashed agent can keep a file blocked.
pub const DEFAULT_LEASE_DURATION_SECS: u64 = 600;

/// Default glob patterns for paths that never take a lease.
pub fn default_exclude_patterns() -> Vec<String> {
    vec![
        "**/*.log".to_string(),
        "**/*.tmp".to_string(),
        "**/*.swp".to_string(),
        "**/tmp/**".to_string(),
        "**/.git/**".to_string(),
        "**/.agentlock/**".to_string(),
        "**/node_modules/**".to_string(),
        "**/target/**".to_string(),
        "**/.venv/**".to_string(),
        "**/__pycache__/**".to_string(),
    ]
}

// Default value functions for serde
pub(crate) fn default_lease_duration_secs() -> u64 {
    DEFAULT_LEASE_DURATION_SECS
}
pub(crate) fn default_lock_dir() -> String {
    "locks".to_string()
}
pub(crate) fn default_activity_dir() -> String {
    "activity".to_string()
}
pub(crate) fn default_true() -> bool {
    true
}

/// Upper bound on any lease: one week.
pub const MAX_LEASE_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Convert a second count into a lease duration, clamped to the maximum.
pub fn lease_duration_from_secs(secs: u64) -> chrono::Duration {
    let clamped = secs.min(MAX_LEASE_DURATION_SECS);
    chrono::Duration::seconds(i64::try_from(clamped).unwrap_or(0))
}
