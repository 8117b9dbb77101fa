//! Lease-based advisory locking for agentlock.
//!
//! Agents take a lease on a resource path before mutating it and release it
//! afterwards. A lease lapses on its own once `expires_at` passes, so a
//! crashed agent blocks others for at most one lease duration.
//!
//! # Lock Files
//!
//! Each lease is one JSON file in the lock directory (see
//! [`crate::store`]). New leases are created with exclusive-create
//! semantics, so two agents racing for an unlocked resource cannot both
//! win.
//!
//! # Reclamation
//!
//! There is no background sweeper. Every acquire first deletes all expired
//! leases, emitting one `lock_expired` activity event per deletion.
//!
//! # Outcomes
//!
//! Denial, not-held, and not-owner are ordinary variants of
//! [`AcquireOutcome`] and [`ReleaseOutcome`]. Errors are reserved for an
//! unusable lock directory.

mod admin;
mod coordinator;
mod guard;
mod types;


// Re-export public API
pub use coordinator::LockCoordinator;
pub use guard::LeaseGuard;
pub use types::{
    AcquireOutcome, AcquireRequest, Grant, GrantKind, LockInfo, LockOwnerInfo, ReleaseOutcome,
};
