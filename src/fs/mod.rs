//! Filesystem primitives for agentlock.
//!
//! Every write into the shared lock directory goes through this module so
//! that no reader in another process ever observes a partially written
//! record.

pub mod atomic;

pub use atomic::{atomic_write, create_exclusive};
