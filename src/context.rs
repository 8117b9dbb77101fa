//! State root and path resolution for agentlock.
//!
//! Every agent that wants to coordinate with the others must resolve the
//! same state root, so resolution is deliberately simple:
//! - `AGENTLOCK_HOME` if set (shared across working directories), otherwise
//! - `<cwd>/.agentlock`
//!
//! The config file lives at `<state root>/config.yaml`; the lock and
//! activity directories come from the config and resolve against the state
//! root when relative.

use crate::config::Config;
use crate::error::{AgentLockError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the state root.
pub const HOME_ENV_VAR: &str = "AGENTLOCK_HOME";

/// Default state root directory name, relative to the working directory.
pub const DEFAULT_STATE_DIR: &str = ".agentlock";

/// Config file name within the state root.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Journal file name within the activity directory.
pub const JOURNAL_FILE_NAME: &str = "activity.ndjson";

/// Resolved paths and configuration for one agentlock invocation.
///
/// All paths are absolute when resolved through [`LockContext::resolve`].
#[derive(Debug, Clone)]
pub struct LockContext {
    /// Root directory holding config, locks, and activity.
    pub state_root: PathBuf,

    /// Path to `config.yaml` (may not exist).
    pub config_path: PathBuf,

    /// Directory of lock records.
    pub lock_dir: PathBuf,

    /// Directory of the activity journal.
    pub activity_dir: PathBuf,

    /// Loaded configuration.
    pub config: Config,
}

impl LockContext {
    /// Resolve the context from the environment and current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            AgentLockError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd)
    }

    /// Resolve the context as if invoked from `cwd`.
    ///
    /// `AGENTLOCK_HOME` still takes precedence; a relative value is taken
    /// relative to `cwd`.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Result<Self> {
        let cwd = cwd.as_ref();

        let state_root = match env::var(HOME_ENV_VAR) {
            Ok(home) if !home.trim().is_empty() => cwd.join(home.trim()),
            _ => cwd.join(DEFAULT_STATE_DIR),
        };

        Self::from_root(state_root)
    }

    /// Build a context rooted at `state_root`, loading `config.yaml` if present.
    pub fn from_root<P: Into<PathBuf>>(state_root: P) -> Result<Self> {
        let state_root = state_root.into();
        let config_path = state_root.join(CONFIG_FILE_NAME);
        let config = Config::load_or_default(&config_path)?;

        Ok(Self::with_config(state_root, config))
    }

    /// Build a context rooted at `state_root` with an explicit config.
    pub fn with_config<P: Into<PathBuf>>(state_root: P, config: Config) -> Self {
        let state_root = state_root.into();
        let config_path = state_root.join(CONFIG_FILE_NAME);
        let lock_dir = state_root.join(&config.lock_dir);
        let activity_dir = state_root.join(&config.activity_dir);

        Self {
            state_root,
            config_path,
            lock_dir,
            activity_dir,
            config,
        }
    }

    /// Path to the activity journal file.
    pub fn journal_path(&self) -> PathBuf {
        self.activity_dir.join(JOURNAL_FILE_NAME)
    }
}
