//! Atomic filesystem operations for agentlock.
//!
//! # Implementation Strategy
//!
//! Both writers follow the same pattern:
//! 1. Write content to a uniquely named temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Publish it under the final name in a single filesystem operation
//!
//! [`atomic_write`] publishes with `rename()`, replacing any existing file.
//! [`create_exclusive`] publishes with `link()`, which fails if the final
//! name already exists. That makes it a create-if-absent primitive that
//! still never exposes a half-written file.
//!
//! # Important Notes
//!
//! - Source and destination must be on the same filesystem for atomic rename
//! - On crash, a temporary file may remain (named `.{filename}.{uuid}.tmp`)
//! - Temporary names carry a random suffix so concurrent writers from
//!   different processes never share a temp file

use crate::error::{AgentLockError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Atomically write bytes to a file, replacing it if it exists.
///
/// # Example
///
/// ```no_run
/// use agentlock::fs::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("locks/src_main.rs.lock"), b"{}")?;
/// # Ok::<(), agentlock::error::AgentLockError>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    ensure_parent_dir(path)?;

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        AgentLockError::io(
            format!("failed to atomically replace '{}'", path.display()),
            e,
        )
    })?;

    sync_parent_dir(path);
    Ok(())
}

/// Create a file with the given content only if it does not already exist.
///
/// # Returns
///
/// * `Ok(true)` - The file was created and holds the complete content
/// * `Ok(false)` - A file already exists at `path`; nothing was written
/// * `Err(AgentLockError::IoFailure)` - Any other write failure
pub fn create_exclusive<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<bool> {
    let path = path.as_ref();

    ensure_parent_dir(path)?;

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;

    let linked = fs::hard_link(&temp_path, path);
    let _ = fs::remove_file(&temp_path);

    match linked {
        Ok(()) => {
            sync_parent_dir(path);
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) if e.kind() == ErrorKind::Unsupported || e.kind() == ErrorKind::PermissionDenied => {
            // Some filesystems (FAT, certain network mounts) refuse hard links.
            create_new_fallback(path, content)
        }
        Err(e) => Err(AgentLockError::io(
            format!("failed to create '{}'", path.display()),
            e,
        )),
    }
}

/// Exclusive create via `O_CREAT | O_EXCL`. A concurrent reader may briefly
/// see an empty file, which it reports as malformed.
fn create_new_fallback(path: &Path, content: &[u8]) -> Result<bool> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(AgentLockError::io(
                format!("failed to create '{}'", path.display()),
                e,
            ));
        }
    };

    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(path);
            AgentLockError::io(format!("failed to write '{}'", path.display()), e)
        })?;

    Ok(true)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            AgentLockError::io(
                format!("failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }
    Ok(())
}

/// Generate a temporary file path in the same directory as the target.
fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            AgentLockError::UserError(format!("invalid file path '{}'", target.display()))
        })?;

    let temp_name = format!(".{}.{}.tmp", filename, Uuid::new_v4().simple());
    Ok(parent.join(temp_name))
}

/// Write content to a file and sync to disk.
fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        AgentLockError::io(
            format!("failed to create temporary file '{}'", path.display()),
            e,
        )
    })?;

    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(path);
            AgentLockError::io(
                format!("failed to write temporary file '{}'", path.display()),
                e,
            )
        })
}

/// Persist the directory entry. Best-effort.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }
}

/// Directories cannot be opened for sync on this platform.
#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}
