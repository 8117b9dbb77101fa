//! Agent identity resolution.
//!
//! An agent must present the same id to release a lease that it presented
//! to acquire it. Each hook invocation is a fresh process, so the id cannot
//! come from the process itself; it is derived from context that is stable
//! across the invocations of one agent session:
//!
//! 1. An explicit session id (from hook input), otherwise
//! 2. `AGENTLOCK_SESSION_ID` / `CLAUDE_SESSION_ID` from the environment, otherwise
//! 3. The parent process id plus host name. The parent is the long-lived
//!    agent process that spawns each hook.

use std::env;

/// Environment variables consulted for a session id, in order.
pub const SESSION_ENV_VARS: &[&str] = &["AGENTLOCK_SESSION_ID", "CLAUDE_SESSION_ID"];

/// Inputs to agent id derivation, captured once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySource {
    /// Stable cross-call session identifier, when known.
    pub session_id: Option<String>,

    /// Parent process id, when the platform exposes it.
    pub parent_pid: Option<u32>,

    /// Host name, or `unknown`.
    pub host: String,
}

impl IdentitySource {
    /// Capture the identity context of the current process.
    ///
    /// `explicit_session` (e.g. from hook input) wins over the environment.
    pub fn from_env(explicit_session: Option<&str>) -> Self {
        let session_id = explicit_session
            .map(str::to_string)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                SESSION_ENV_VARS
                    .iter()
                    .filter_map(|var| env::var(var).ok())
                    .find(|s| !s.trim().is_empty())
            });

        Self {
            session_id,
            parent_pid: parent_pid(),
            host: host_name(),
        }
    }
}

/// Derive the agent id. Pure: equal sources give equal ids.
pub fn resolve_agent_id(source: &IdentitySource) -> String {
    match source.session_id.as_deref().map(str::trim) {
        Some(session) if !session.is_empty() => format!("session-{}", session),
        _ => match source.parent_pid {
            Some(ppid) => format!("proc-{}@{}", ppid, source.host),
            None => format!("proc-{}@{}", std::process::id(), source.host),
        },
    }
}

#[cfg(unix)]
fn parent_pid() -> Option<u32> {
    Some(std::os::unix::process::parent_id())
}

#[cfg(not(unix))]
fn parent_pid() -> Option<u32> {
    None
}

fn host_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_session_env() -> Vec<(&'static str, Option<String>)> {
        let saved = SESSION_ENV_VARS
            .iter()
            .map(|var| (*var, env::var(var).ok()))
            .collect();
        for var in SESSION_ENV_VARS {
            // SAFETY: tests touching the environment are #[serial].
            unsafe { env::remove_var(var) };
        }
        saved
    }

    fn restore_env(saved: Vec<(&'static str, Option<String>)>) {
        for (var, value) in saved {
            unsafe {
                match value {
                    Some(v) => env::set_var(var, v),
                    None => env::remove_var(var),
                }
            }
        }
    }

    #[test]
    fn session_id_wins() {
        let source = IdentitySource {
            session_id: Some("abc-123".to_string()),
            parent_pid: Some(42),
            host: "box".to_string(),
        };
        assert_eq!(resolve_agent_id(&source), "session-abc-123");
    }

    #[test]
    fn falls_back_to_parent_process() {
        let source = IdentitySource {
            session_id: None,
            parent_pid: Some(42),
            host: "box".to_string(),
        };
        assert_eq!(resolve_agent_id(&source), "proc-42@box");
    }

    #[test]
    fn blank_session_is_ignored() {
        let source = IdentitySource {
            session_id: Some("   ".to_string()),
            parent_pid: Some(7),
            host: "box".to_string(),
        };
        assert_eq!(resolve_agent_id(&source), "proc-7@box");
    }

    #[test]
    fn resolution_is_stable() {
        let source = IdentitySource {
            session_id: Some("s".to_string()),
            parent_pid: None,
            host: "h".to_string(),
        };
        assert_eq!(resolve_agent_id(&source), resolve_agent_id(&source.clone()));
    }

    #[test]
    #[serial]
    fn explicit_session_beats_environment() {
        let saved = clear_session_env();
        unsafe { env::set_var("AGENTLOCK_SESSION_ID", "from-env") };

        let source = IdentitySource::from_env(Some("from-hook"));
        assert_eq!(source.session_id.as_deref(), Some("from-hook"));

        restore_env(saved);
    }

    #[test]
    #[serial]
    fn environment_session_used_when_no_explicit() {
        let saved = clear_session_env();
        unsafe { env::set_var("CLAUDE_SESSION_ID", "host-session") };

        let source = IdentitySource::from_env(None);
        assert_eq!(source.session_id.as_deref(), Some("host-session"));

        restore_env(saved);
    }

    #[test]
    #[serial]
    fn no_session_anywhere_uses_process_identity() {
        let saved = clear_session_env();

        let first = resolve_agent_id(&IdentitySource::from_env(None));
        let second = resolve_agent_id(&IdentitySource::from_env(Some("")));

        assert!(first.starts_with("proc-"));
        assert_eq!(first, second);

        restore_env(saved);
    }
}
