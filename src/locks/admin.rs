//! Administrative operations: listing, forced release, and crash cleanup.
//!
//! These bypass ownership checks. They are meant for operators and for
//! supervising infrastructure that knows an agent process has exited, not
//! for agents themselves.

use super::coordinator::LockCoordinator;
use super::types::LockInfo;
use crate::error::Result;
use crate::journal::{ActivityAction, ActivityEvent};
use crate::store::{LockRecord, ResourceKey};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

impl LockCoordinator {
    /// Every stored lease, live or expired, sorted by resource path.
    pub fn list_locks(&self) -> Result<Vec<LockInfo>> {
        self.list_locks_at(Utc::now())
    }

    /// [`list_locks`](Self::list_locks) with an explicit clock reading.
    pub fn list_locks_at(&self, now: DateTime<Utc>) -> Result<Vec<LockInfo>> {
        Ok(self
            .store()
            .list()?
            .into_iter()
            .map(|record| LockInfo::from_record(record, now))
            .collect())
    }

    /// Remove the lease on `resource_path` whoever owns it.
    ///
    /// `actor` is recorded as the agent responsible. Returns the removed
    /// record, or `None` if there was nothing to remove.
    pub fn force_release(&self, resource_path: &str, actor: &str) -> Result<Option<LockRecord>> {
        let key = ResourceKey::from_path(resource_path);
        let existing = self.load(&key, true)?;

        let Some(existing) = existing else {
            return Ok(None);
        };
        if !self.remove_if_current(&key, existing.lock_id)? {
            return Ok(None);
        }

        info!(
            resource = resource_path,
            owner = %existing.owner_agent_id,
            actor,
            "lease force-released"
        );
        self.journal().record(
            &ActivityEvent::new(ActivityAction::LockReleased, actor)
                .with_resource(resource_path)
                .with_details(json!({
                    "resource_key": key.as_str(),
                    "lock_id": existing.lock_id,
                    "reason": "admin_override",
                    "owner_agent_id": existing.owner_agent_id,
                    "operation": existing.operation,
                })),
        );

        Ok(Some(existing))
    }

    /// Remove every lease owned by `agent_id`, expired or not.
    ///
    /// Returns how many were removed.
    pub fn release_all_for(&self, agent_id: &str) -> Result<usize> {
        self.release_all_for_at(agent_id, Utc::now())
    }

    /// [`release_all_for`](Self::release_all_for) with an explicit clock reading.
    pub fn release_all_for_at(&self, agent_id: &str, now: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;

        for record in self.store().list()? {
            if record.owner_agent_id != agent_id {
                continue;
            }
            // Skip leases reclaimed by another agent since the listing.
            if !self.remove_if_current(&record.resource_key, record.lock_id)? {
                continue;
            }
            removed += 1;

            self.journal().record(
                &ActivityEvent::at(now, ActivityAction::LockReleased, agent_id)
                    .with_resource(&record.resource_path)
                    .with_details(json!({
                        "resource_key": record.resource_key.as_str(),
                        "lock_id": record.lock_id,
                        "reason": "agent_cleanup",
                        "operation": record.operation,
                    })),
            );
        }

        info!(agent = agent_id, removed, "released all leases for agent");
        Ok(removed)
    }
}
