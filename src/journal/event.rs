//! Activity event types.

use crate::error::{AgentLockError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Actions that can be logged as activity events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// A lease was created.
    LockCreated,
    /// A lease was removed by its owner, an agent cleanup, or an administrator.
    LockReleased,
    /// An expired lease was reclaimed.
    LockExpired,
    /// The gatekeeper blocked an operation on a leased resource.
    LockDenied,
    /// A collaborator recorded a file operation.
    Operation,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityAction::LockCreated => write!(f, "lock_created"),
            ActivityAction::LockReleased => write!(f, "lock_released"),
            ActivityAction::LockExpired => write!(f, "lock_expired"),
            ActivityAction::LockDenied => write!(f, "lock_denied"),
            ActivityAction::Operation => write!(f, "operation"),
        }
    }
}

/// An immutable entry in the activity journal.
///
/// Events are serialized as single-line JSON objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: ActivityAction,

    /// Agent the event is attributed to.
    pub agent_id: String,

    /// Resource path or key the event concerns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Freeform details object with action-specific information.
    #[serde(default)]
    pub details: Value,
}

impl ActivityEvent {
    /// Create a new event stamped with the current time.
    pub fn new(action: ActivityAction, agent_id: impl Into<String>) -> Self {
        Self::at(Utc::now(), action, agent_id)
    }

    /// Create a new event with an explicit timestamp.
    pub fn at(ts: DateTime<Utc>, action: ActivityAction, agent_id: impl Into<String>) -> Self {
        Self {
            ts,
            action,
            agent_id: agent_id.into(),
            resource: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the resource this event concerns.
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string (no trailing newline).
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            AgentLockError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }

    /// Parse one journal line.
    pub fn from_ndjson_line(line: &str) -> Result<Self> {
        serde_json::from_str(line)
            .map_err(|e| AgentLockError::MalformedRecord(format!("invalid journal line: {}", e)))
    }
}
