//! Acquire, release, and reclamation.

use super::types::{AcquireOutcome, AcquireRequest, Grant, GrantKind, LockOwnerInfo, ReleaseOutcome};
use crate::context::LockContext;
use crate::error::{AgentLockError, Result};
use crate::journal::{ActivityAction, ActivityEvent, Journal};
use crate::store::{LeaseStore, LockRecord, ResourceKey};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Exclusive-create attempts per acquire before giving up on a contended key.
const MAX_CREATE_ATTEMPTS: usize = 3;

/// Stateless lease coordinator.
///
/// Every decision is re-derived from a fresh read of the lease store, so any
/// number of coordinators in any number of processes can share one lock
/// directory. Nothing blocks: each call returns a verdict immediately.
#[derive(Debug, Clone)]
pub struct LockCoordinator {
    store: LeaseStore,
    journal: Journal,
    lease_duration: Duration,
    exclusive_create: bool,
}

impl LockCoordinator {
    /// Create a coordinator with exclusive record creation enabled.
    pub fn new(store: LeaseStore, journal: Journal, lease_duration: Duration) -> Self {
        Self {
            store,
            journal,
            lease_duration,
            exclusive_create: true,
        }
    }

    /// Build a coordinator from a resolved context and its config.
    pub fn from_context(ctx: &LockContext) -> Self {
        Self::new(
            LeaseStore::new(&ctx.lock_dir),
            Journal::new(ctx.journal_path()),
            ctx.config.lease_duration(),
        )
        .with_exclusive_create(ctx.config.exclusive_create)
    }

    /// Choose between exclusive create (default) and read-then-overwrite.
    pub fn with_exclusive_create(mut self, exclusive_create: bool) -> Self {
        self.exclusive_create = exclusive_create;
        self
    }

    pub fn store(&self) -> &LeaseStore {
        &self.store
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn lease_duration(&self) -> Duration {
        self.lease_duration
    }

    /// Try to take a lease on `req.resource_path` for `req.agent_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(AcquireOutcome::Granted(_))` - The caller now holds the lease
    /// * `Ok(AcquireOutcome::DeniedBy(_))` - Another agent holds a live lease
    /// * `Err(AgentLockError::IoFailure)` - The lease store is unusable
    pub fn acquire(&self, req: &AcquireRequest<'_>) -> Result<AcquireOutcome> {
        self.acquire_at(req, Utc::now())
    }

    /// [`acquire`](Self::acquire) with an explicit clock reading.
    pub fn acquire_at(
        &self,
        req: &AcquireRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<AcquireOutcome> {
        // Opportunistic sweep so stale leases never pile up.
        if let Err(e) = self.cleanup_expired_at(now) {
            warn!(error = %e, "expired-lease sweep failed; continuing with acquire");
        }

        let key = ResourceKey::from_path(req.resource_path);
        let lease = req.lease.unwrap_or(self.lease_duration);

        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            if let Some(existing) = self.load(&key, true)? {
                if existing.is_live(now) {
                    return Ok(self.verdict_for_live(existing, req, now));
                }
                self.reclaim(&key, &existing, now)?;
            }

            let record = LockRecord::new(
                req.resource_path,
                req.agent_id,
                req.operation,
                req.session_id.map(str::to_string),
                now,
                lease,
            );

            let created = if self.exclusive_create {
                self.store.put_new(&key, &record)?
            } else {
                self.store.put(&key, &record)?;
                true
            };

            if created {
                info!(
                    resource = req.resource_path,
                    agent = req.agent_id,
                    lock_id = %record.lock_id,
                    expires_at = %record.expires_at,
                    "lease created"
                );
                self.journal.record(
                    &ActivityEvent::at(now, ActivityAction::LockCreated, req.agent_id)
                        .with_resource(req.resource_path)
                        .with_details(json!({
                            "resource_key": key.as_str(),
                            "lock_id": record.lock_id,
                            "operation": req.operation,
                            "session_id": req.session_id,
                            "expires_at": record.expires_at,
                        })),
                );
                return Ok(AcquireOutcome::Granted(Grant {
                    record,
                    kind: GrantKind::Created,
                }));
            }

            debug!(
                resource = req.resource_path,
                attempt, "lost exclusive-create race; re-reading"
            );
        }

        // Still contended after every attempt: report whoever holds it now.
        match self.load(&key, false)? {
            Some(existing) if existing.is_live(now) => {
                Ok(self.verdict_for_live(existing, req, now))
            }
            _ => Err(AgentLockError::IoFailure(format!(
                "could not create lock record for '{}' after {} attempts",
                req.resource_path, MAX_CREATE_ATTEMPTS
            ))),
        }
    }

    /// Remove the caller's lease on `resource_path`.
    ///
    /// A caller that does not own the lease never removes it.
    pub fn release(&self, resource_path: &str, agent_id: &str) -> Result<ReleaseOutcome> {
        self.release_at(resource_path, agent_id, Utc::now())
    }

    /// [`release`](Self::release) with an explicit clock reading.
    pub fn release_at(
        &self,
        resource_path: &str,
        agent_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ReleaseOutcome> {
        let key = ResourceKey::from_path(resource_path);

        let Some(existing) = self.load(&key, false)? else {
            debug!(resource = resource_path, agent = agent_id, "release: not held");
            return Ok(ReleaseOutcome::NotHeld);
        };

        if existing.owner_agent_id != agent_id {
            debug!(
                resource = resource_path,
                agent = agent_id,
                owner = %existing.owner_agent_id,
                "release: not owner"
            );
            return Ok(ReleaseOutcome::NotOwner {
                owner_agent_id: existing.owner_agent_id,
            });
        }

        // The lease may have expired and been replaced since it was read.
        if !self.remove_if_current(&key, existing.lock_id)? {
            return Ok(ReleaseOutcome::NotHeld);
        }

        info!(
            resource = resource_path,
            agent = agent_id,
            lock_id = %existing.lock_id,
            "lease released"
        );
        self.journal.record(
            &ActivityEvent::at(now, ActivityAction::LockReleased, agent_id)
                .with_resource(resource_path)
                .with_details(json!({
                    "resource_key": key.as_str(),
                    "lock_id": existing.lock_id,
                    "reason": "released",
                    "operation": existing.operation,
                    "held_secs": now.signed_duration_since(existing.acquired_at).num_seconds(),
                })),
        );

        Ok(ReleaseOutcome::Released)
    }

    /// Delete every expired lease. Returns how many were removed.
    pub fn cleanup_expired(&self) -> Result<usize> {
        self.cleanup_expired_at(Utc::now())
    }

    /// [`cleanup_expired`](Self::cleanup_expired) with an explicit clock reading.
    pub fn cleanup_expired_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;
        for record in self.store.list()? {
            if record.is_live(now) {
                continue;
            }
            let key = record.resource_key.clone();
            if self.reclaim(&key, &record, now)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub(super) fn load(
        &self,
        key: &ResourceKey,
        purge_malformed: bool,
    ) -> Result<Option<LockRecord>> {
        match self.store.get(key) {
            Ok(record) => Ok(record),
            Err(AgentLockError::MalformedRecord(msg)) => {
                warn!(
                    resource_key = %key,
                    error = %msg,
                    "treating malformed lock record as absent"
                );
                if purge_malformed {
                    self.store.delete(key)?;
                }
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the record under `key` only if it is still lease `lock_id`.
    ///
    /// Returns whether this call removed it. A record that was already
    /// removed, or reclaimed and replaced by another agent, is left alone.
    pub(super) fn remove_if_current(&self, key: &ResourceKey, lock_id: Uuid) -> Result<bool> {
        match self.load(key, false)? {
            Some(current) if current.lock_id == lock_id => self.store.delete(key),
            _ => Ok(false),
        }
    }

    /// Delete an expired record if it is still the one we read, and log it.
    ///
    /// Returns whether this call removed it. Only the remover emits
    /// `lock_expired`, so each reclamation is journaled once.
    fn reclaim(&self, key: &ResourceKey, expired: &LockRecord, now: DateTime<Utc>) -> Result<bool> {
        if !self.remove_if_current(key, expired.lock_id)? {
            return Ok(false);
        }

        info!(
            resource = %expired.resource_path,
            owner = %expired.owner_agent_id,
            lock_id = %expired.lock_id,
            "expired lease reclaimed"
        );
        self.journal.record(
            &ActivityEvent::at(now, ActivityAction::LockExpired, &expired.owner_agent_id)
                .with_resource(&expired.resource_path)
                .with_details(json!({
                    "resource_key": key.as_str(),
                    "lock_id": expired.lock_id,
                    "operation": expired.operation,
                    "expired_at": expired.expires_at,
                })),
        );
        Ok(true)
    }

    fn verdict_for_live(
        &self,
        existing: LockRecord,
        req: &AcquireRequest<'_>,
        now: DateTime<Utc>,
    ) -> AcquireOutcome {
        if existing.owner_agent_id == req.agent_id {
            debug!(resource = req.resource_path, agent = req.agent_id, "lease re-entered");
            return AcquireOutcome::Granted(Grant {
                record: existing,
                kind: GrantKind::Reentered,
            });
        }

        let info = LockOwnerInfo::from_record(&existing, now);
        debug!(
            resource = req.resource_path,
            agent = req.agent_id,
            owner = %info.owner_agent_id,
            remaining_minutes = info.remaining_minutes,
            "lease denied"
        );
        AcquireOutcome::DeniedBy(info)
    }
}
