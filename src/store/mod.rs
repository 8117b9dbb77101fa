//! Lease store: durable lock records, one file per resource.
//!
//! # Layout
//!
//! Records live in the configured lock directory as
//! `<resource_key>.lock`, each holding one pretty-printed JSON
//! [`LockRecord`]. The store holds no logic beyond reading and writing
//! those files; expiry and ownership decisions belong to
//! [`crate::locks::LockCoordinator`].
//!
//! # Atomicity
//!
//! - [`LeaseStore::put`] writes a temp file and renames it into place.
//! - [`LeaseStore::put_new`] writes a temp file and hard-links it into
//!   place, failing if a record already exists.
//! - [`LeaseStore::delete`] is a single `unlink`.
//!
//! Readers therefore see either a complete record or none at all.

mod key;
mod record;


pub use key::ResourceKey;
pub use record::LockRecord;

use crate::error::{AgentLockError, Result};
use crate::fs::{atomic_write, create_exclusive};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File extension of lock records.
pub const LOCK_FILE_EXTENSION: &str = "lock";

/// Directory-backed store of lock records.
#[derive(Debug, Clone)]
pub struct LeaseStore {
    dir: PathBuf,
}

impl LeaseStore {
    /// Create a store over `dir`. The directory is created lazily on first write.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the record for `key`.
    pub fn path_for(&self, key: &ResourceKey) -> PathBuf {
        self.dir.join(format!("{}.{}", key.as_str(), LOCK_FILE_EXTENSION))
    }

    /// Read the record for `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - A record exists and parsed
    /// * `Ok(None)` - No record exists
    /// * `Err(AgentLockError::MalformedRecord)` - A file exists but does not parse
    /// * `Err(AgentLockError::IoFailure)` - The file could not be read
    pub fn get(&self, key: &ResourceKey) -> Result<Option<LockRecord>> {
        let path = self.path_for(key);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AgentLockError::io(
                    format!("failed to read lock file '{}'", path.display()),
                    e,
                ));
            }
        };

        LockRecord::from_json(&content)
            .map(Some)
            .map_err(|e| AgentLockError::MalformedRecord(format!("'{}': {}", path.display(), e)))
    }

    /// Write the record for `key`, replacing any existing one.
    pub fn put(&self, key: &ResourceKey, record: &LockRecord) -> Result<()> {
        let json = record.to_json()?;
        atomic_write(self.path_for(key), json.as_bytes())
    }

    /// Write the record for `key` only if none exists.
    ///
    /// Returns `Ok(false)` without touching the existing record when one is
    /// already present.
    pub fn put_new(&self, key: &ResourceKey, record: &LockRecord) -> Result<bool> {
        let json = record.to_json()?;
        create_exclusive(self.path_for(key), json.as_bytes())
    }

    /// Remove the record for `key`. Returns whether a record was removed.
    pub fn delete(&self, key: &ResourceKey) -> Result<bool> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AgentLockError::io(
                format!("failed to remove lock file '{}'", path.display()),
                e,
            )),
        }
    }

    /// Enumerate every stored record, sorted by resource path.
    ///
    /// Files that fail to parse are skipped with a warning. A missing lock
    /// directory is an empty store.
    pub fn list(&self) -> Result<Vec<LockRecord>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AgentLockError::io(
                    format!("failed to read lock directory '{}'", self.dir.display()),
                    e,
                ));
            }
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                AgentLockError::io(
                    format!("failed to read entry in '{}'", self.dir.display()),
                    e,
                )
            })?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some(LOCK_FILE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match self.get(&ResourceKey::from_raw(stem)) {
                Ok(Some(record)) => records.push(record),
                // Removed between read_dir and read
                Ok(None) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable lock record")
                }
            }
        }

        records.sort_by(|a, b| a.resource_path.cmp(&b.resource_path));
        Ok(records)
    }
}
