//! RAII lease guard implementation.

use super::coordinator::LockCoordinator;
use super::types::{AcquireOutcome, AcquireRequest, GrantKind, ReleaseOutcome};
use crate::error::{AgentLockError, Result};
use crate::store::LockRecord;
use tracing::warn;

/// RAII guard for a lease.
///
/// When dropped, the lease is released through the coordinator (so the
/// release is journaled). If release fails, a warning is logged but no
/// panic occurs. A guard obtained by re-entering a lease the agent already
/// held does not release it; the outer holder stays responsible.
#[derive(Debug)]
pub struct LeaseGuard<'a> {
    coordinator: &'a LockCoordinator,
    record: LockRecord,
    owns_release: bool,
    released: bool,
}

impl<'a> LeaseGuard<'a> {
    /// The lease record this guard covers.
    pub fn record(&self) -> &LockRecord {
        &self.record
    }

    /// Manually release the lease, handling errors explicitly.
    pub fn release(mut self) -> Result<ReleaseOutcome> {
        self.released = true;
        if !self.owns_release {
            return Ok(ReleaseOutcome::NotHeld);
        }
        self.coordinator
            .release(&self.record.resource_path, &self.record.owner_agent_id)
    }
}

impl Drop for LeaseGuard<'_> {
    fn drop(&mut self) {
        if self.released || !self.owns_release {
            return;
        }
        if let Err(e) = self
            .coordinator
            .release(&self.record.resource_path, &self.record.owner_agent_id)
        {
            warn!(
                resource = %self.record.resource_path,
                error = %e,
                "failed to release lease on drop"
            );
        }
    }
}

impl LockCoordinator {
    /// Acquire a lease and wrap it in a guard that releases on drop.
    ///
    /// # Returns
    ///
    /// * `Ok(LeaseGuard)` - The lease is held
    /// * `Err(AgentLockError::LockDenied)` - Another agent holds a live lease
    /// * `Err(AgentLockError::IoFailure)` - The lease store is unusable
    pub fn acquire_guard(&self, req: &AcquireRequest<'_>) -> Result<LeaseGuard<'_>> {
        match self.acquire(req)? {
            AcquireOutcome::Granted(grant) => Ok(LeaseGuard {
                coordinator: self,
                owns_release: grant.kind == GrantKind::Created,
                record: grant.record,
                released: false,
            }),
            AcquireOutcome::DeniedBy(info) => Err(AgentLockError::LockDenied(info.to_string())),
        }
    }
}
