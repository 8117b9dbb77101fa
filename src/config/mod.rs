//! Configuration model for agentlock.
//!
//! This module defines the Config struct that represents `<state root>/config.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for every field, and validation of config values.

mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::Config;
pub use types::{DEFAULT_LEASE_DURATION_SECS, MAX_LEASE_DURATION_SECS, lease_duration_from_secs};
