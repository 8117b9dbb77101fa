//! Activity journal: append-only audit trail of lock activity.
//!
//! Events are stored in NDJSON format (one JSON object per line) in
//! `<activity_dir>/activity.ndjson`. The file is never rewritten,
//! truncated, or rotated here.
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: `lock_created` | `lock_released` | `lock_expired` |
//!   `lock_denied` | `operation`
//! - `agent_id`: the agent the event is attributed to
//! - `resource`: optional resource path or key
//! - `details`: freeform object with action-specific details
//!
//! # Concurrency
//!
//! The file is opened with `O_APPEND` and each event is written with one
//! `write_all` of the complete line, so appends from independent processes
//! interleave at line granularity.
//!
//! # Failure Policy
//!
//! Lock operations call [`Journal::record`], which logs and discards append
//! failures. The journal never decides the outcome of a lock operation.
//!
//! ```no_run
//! use agentlock::journal::{ActivityAction, ActivityEvent, Journal};
//! use serde_json::json;
//!
//! let journal = Journal::new(".agentlock/activity/activity.ndjson");
//! let event = ActivityEvent::new(ActivityAction::Operation, "session-42")
//!     .with_resource("src/main.rs")
//!     .with_details(json!({"tool": "formatter"}));
//! journal.append(&event)?;
//! # Ok::<(), agentlock::error::AgentLockError>(())
//! ```

mod event;
mod reader;

pub use event::{ActivityAction, ActivityEvent};
pub use reader::JournalReader;

use crate::error::{AgentLockError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Handle to a journal file.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Create a handle for the journal at `path`. Nothing is touched until
    /// the first append.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a single line.
    ///
    /// The activity directory and file are created if missing.
    pub fn append(&self, event: &ActivityEvent) -> Result<()> {
        let mut line = event.to_ndjson_line()?;
        line.push('\n');

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir).map_err(|e| {
                AgentLockError::io(
                    format!("failed to create activity directory '{}'", dir.display()),
                    e,
                )
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                AgentLockError::io(
                    format!("failed to open journal '{}'", self.path.display()),
                    e,
                )
            })?;

        file.write_all(line.as_bytes()).map_err(|e| {
            AgentLockError::io(
                format!("failed to append to journal '{}'", self.path.display()),
                e,
            )
        })
    }

    /// Append an event, logging and discarding any failure.
    pub fn record(&self, event: &ActivityEvent) {
        if let Err(e) = self.append(event) {
            warn!(
                action = %event.action,
                journal = %self.path.display(),
                error = %e,
                "failed to record activity event"
            );
        }
    }

    /// Iterate over the journal from the beginning.
    ///
    /// Each call starts a fresh scan. A journal that does not exist yet is
    /// an empty sequence.
    pub fn events(&self) -> Result<JournalReader> {
        let file = match File::open(&self.path) {
            Ok(file) => Some(file),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                return Err(AgentLockError::io(
                    format!("failed to open journal '{}'", self.path.display()),
                    e,
                ));
            }
        };

        Ok(JournalReader::new(self.path.clone(), file))
    }
}
