//! Lock record structure and time helpers.

use super::key::ResourceKey;
use crate::error::{AgentLockError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One lease on one resource, as stored in `<lock_dir>/<resource_key>.lock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Key derived from `resource_path`; also the file stem.
    pub resource_key: ResourceKey,

    /// The path the lease was requested for.
    pub resource_path: String,

    /// Agent holding the lease.
    pub owner_agent_id: String,

    /// Why the lease was taken (e.g. "editing", "writing").
    pub operation: String,

    /// When the lease was created (RFC3339, UTC).
    pub acquired_at: DateTime<Utc>,

    /// When the lease lapses (RFC3339, UTC).
    pub expires_at: DateTime<Utc>,

    /// Session the lease was created under. Diagnostics only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_session_id: Option<String>,

    /// Unique token for this lease instance.
    pub lock_id: Uuid,

    /// Process that created the lease.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// Host that created the lease.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl LockRecord {
    /// Create a fresh lease starting at `now`.
    pub fn new(
        resource_path: &str,
        owner_agent_id: &str,
        operation: &str,
        origin_session_id: Option<String>,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> Self {
        Self {
            resource_key: ResourceKey::from_path(resource_path),
            resource_path: resource_path.to_string(),
            owner_agent_id: owner_agent_id.to_string(),
            operation: operation.to_string(),
            acquired_at: now,
            expires_at: now + lease,
            origin_session_id,
            lock_id: Uuid::new_v4(),
            pid: Some(std::process::id()),
            host: hostname::get()
                .ok()
                .map(|h| h.to_string_lossy().to_string()),
        }
    }

    /// Parse a record from its JSON body.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| AgentLockError::MalformedRecord(format!("invalid lock record: {}", e)))
    }

    /// Serialize to the pretty-printed JSON stored on disk.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            AgentLockError::UserError(format!("failed to serialize lock record: {}", e))
        })
    }

    /// A lease is live strictly before its expiry instant.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Time left on the lease; zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let left = self.expires_at.signed_duration_since(now);
        if left < Duration::zero() {
            Duration::zero()
        } else {
            left
        }
    }

    /// Time left rounded up to whole minutes, for display.
    pub fn remaining_minutes(&self, now: DateTime<Utc>) -> i64 {
        let left = self.remaining(now);
        let whole = left.num_minutes();
        if left > Duration::minutes(whole) {
            whole + 1
        } else {
            whole
        }
    }

    /// Format the lease age as a human-readable string.
    pub fn age_string(&self, now: DateTime<Utc>) -> String {
        let age = now.signed_duration_since(self.acquired_at);
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes.max(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(now: DateTime<Utc>, lease_secs: i64) -> LockRecord {
        LockRecord::new(
            "src/x.go",
            "a1",
            "editing",
            Some("s-1".to_string()),
            now,
            Duration::seconds(lease_secs),
        )
    }

    #[test]
    fn new_record_fields() {
        let now = Utc::now();
        let record = record_at(now, 600);

        assert_eq!(record.resource_key, ResourceKey::from_path("src/x.go"));
        assert_eq!(record.owner_agent_id, "a1");
        assert_eq!(record.operation, "editing");
        assert_eq!(record.acquired_at, now);
        assert_eq!(record.expires_at, now + Duration::seconds(600));
        assert_eq!(record.pid, Some(std::process::id()));
    }

    #[test]
    fn lock_ids_are_unique() {
        let now = Utc::now();
        assert_ne!(record_at(now, 60).lock_id, record_at(now, 60).lock_id);
    }

    #[test]
    fn liveness_boundary() {
        let now = Utc::now();
        let record = record_at(now, 5);

        assert!(record.is_live(now));
        assert!(record.is_live(now + Duration::seconds(4)));
        assert!(!record.is_live(now + Duration::seconds(5)));
        assert!(!record.is_live(now + Duration::seconds(6)));
    }

    #[test]
    fn remaining_minutes_round_up() {
        let now = Utc::now();
        let record = record_at(now, 600);

        assert_eq!(record.remaining_minutes(now), 10);
        assert_eq!(record.remaining_minutes(now + Duration::seconds(10)), 10);
        assert_eq!(record.remaining_minutes(now + Duration::seconds(60)), 9);
        assert_eq!(record.remaining_minutes(now + Duration::seconds(599)), 1);

        // Any live lease reports at least one minute, even with microseconds left.
        let almost = record.expires_at - Duration::microseconds(500);
        assert!(record.is_live(almost));
        assert_eq!(record.remaining_minutes(almost), 1);
        let last_nano = record.expires_at - Duration::nanoseconds(1);
        assert_eq!(record.remaining_minutes(last_nano), 1);
        assert_eq!(record.remaining_minutes(record.expires_at), 0);
        assert_eq!(record.remaining_minutes(now + Duration::seconds(700)), 0);
        assert_eq!(record.remaining(now + Duration::seconds(700)), Duration::zero());
    }

    #[test]
    fn json_roundtrip_preserves_subsecond_timestamps() {
        let now = Utc::now();
        let record = record_at(now, 600);

        let parsed = LockRecord::from_json(&record.to_json().unwrap()).unwrap();

        assert_eq!(parsed, record);
        assert_eq!(parsed.acquired_at.timestamp_nanos_opt(), now.timestamp_nanos_opt());
    }

    #[test]
    fn malformed_json_is_malformed_record() {
        let err = LockRecord::from_json("{\"owner_agent_id\": 3").unwrap_err();
        assert!(matches!(err, AgentLockError::MalformedRecord(_)));
    }

    #[test]
    fn age_string_formats() {
        let now = Utc::now();
        let mut record = record_at(now, 600);
        assert_eq!(record.age_string(now), "0m");

        record.acquired_at = now - Duration::hours(2);
        assert_eq!(record.age_string(now), "2h 0m");

        record.acquired_at = now - Duration::days(3);
        assert!(record.age_string(now).contains('d'));
    }
}
