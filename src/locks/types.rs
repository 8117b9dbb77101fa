//! Request and outcome types for lock operations.

use crate::store::LockRecord;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use uuid::Uuid;

/// Parameters of one acquire call.
#[derive(Debug, Clone, Copy)]
pub struct AcquireRequest<'a> {
    /// Path of the resource to lease.
    pub resource_path: &'a str,

    /// Agent requesting the lease.
    pub agent_id: &'a str,

    /// Why the lease is wanted (e.g. "editing").
    pub operation: &'a str,

    /// Session the request is made under, recorded for diagnostics.
    pub session_id: Option<&'a str>,

    /// Lease length override; the coordinator default applies when `None`.
    pub lease: Option<Duration>,
}

impl<'a> AcquireRequest<'a> {
    pub fn new(resource_path: &'a str, agent_id: &'a str, operation: &'a str) -> Self {
        Self {
            resource_path,
            agent_id,
            operation,
            session_id: None,
            lease: None,
        }
    }

    pub fn with_session(mut self, session_id: Option<&'a str>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_lease(mut self, lease: Duration) -> Self {
        self.lease = Some(lease);
        self
    }
}

/// How a granted lease came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantKind {
    /// A new record was written for the caller.
    Created,
    /// The caller already held a live lease; nothing was changed.
    Reentered,
}

/// A granted lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// The record now on disk for the resource.
    pub record: LockRecord,

    pub kind: GrantKind,
}

/// Who holds a resource that was denied to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOwnerInfo {
    pub resource_path: String,
    pub owner_agent_id: String,
    pub operation: String,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub lock_id: Uuid,

    /// Time left on the owner's lease at the decision point.
    pub remaining: Duration,

    /// `remaining` rounded up to whole minutes.
    pub remaining_minutes: i64,
}

impl LockOwnerInfo {
    pub(crate) fn from_record(record: &LockRecord, now: DateTime<Utc>) -> Self {
        Self {
            resource_path: record.resource_path.clone(),
            owner_agent_id: record.owner_agent_id.clone(),
            operation: record.operation.clone(),
            acquired_at: record.acquired_at,
            expires_at: record.expires_at,
            lock_id: record.lock_id,
            remaining: record.remaining(now),
            remaining_minutes: record.remaining_minutes(now),
        }
    }
}

impl fmt::Display for LockOwnerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is locked by agent {} ({}); lease expires in {} minute{}",
            self.resource_path,
            self.owner_agent_id,
            self.operation,
            self.remaining_minutes,
            if self.remaining_minutes == 1 { "" } else { "s" }
        )
    }
}

/// Verdict of an acquire call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    Granted(Grant),
    DeniedBy(LockOwnerInfo),
}

impl AcquireOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, AcquireOutcome::Granted(_))
    }
}

/// Verdict of a release call. None of these are failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The caller's lease was removed.
    Released,
    /// No lease existed for the resource.
    NotHeld,
    /// Another agent holds the lease; it was left untouched.
    NotOwner { owner_agent_id: String },
}

impl fmt::Display for ReleaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseOutcome::Released => write!(f, "released"),
            ReleaseOutcome::NotHeld => write!(f, "not held"),
            ReleaseOutcome::NotOwner { owner_agent_id } => {
                write!(f, "not owner (held by {})", owner_agent_id)
            }
        }
    }
}

/// A stored lease as seen by the administrative listing.
#[derive(Debug, Clone)]
pub struct LockInfo {
    pub record: LockRecord,

    /// Whether the lease was live at listing time.
    pub is_live: bool,

    /// Whole minutes left (rounded up); zero once expired.
    pub remaining_minutes: i64,

    /// Human-readable age at listing time.
    pub age: String,
}

impl LockInfo {
    pub(crate) fn from_record(record: LockRecord, now: DateTime<Utc>) -> Self {
        Self {
            is_live: record.is_live(now),
            remaining_minutes: record.remaining_minutes(now),
            age: record.age_string(now),
            record,
        }
    }
}

impl fmt::Display for LockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (owner: {}, age: {}, operation: {}, {})",
            self.record.resource_path,
            self.record.owner_agent_id,
            self.age,
            self.record.operation,
            if self.is_live {
                format!("{}m left", self.remaining_minutes)
            } else {
                "EXPIRED".to_string()
            }
        )
    }
}
