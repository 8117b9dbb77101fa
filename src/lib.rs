//! Agentlock: lease-based advisory locks for agents sharing a filesystem.
//!
//! Agents take a short lease on a file before mutating it and release it
//! afterwards. State is plain files under a shared state root:
//! - `locks/` holds one JSON record per leased resource
//! - `activity/activity.ndjson` is an append-only journal of lock events
//!
//! The [`gatekeeper`] module wires the coordinator into a host tool's
//! pre/post mutation hooks.

pub mod config;
pub mod context;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod gatekeeper;
pub mod identity;
pub mod journal;
pub mod locks;
pub mod store;
