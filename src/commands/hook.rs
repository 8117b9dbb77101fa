//! `agentlock hook pre|post`: the host tool's mutation hooks.
//!
//! Both stages fail open. Unreadable input or an unusable state root is
//! reported as a warning and the hook exits successfully; only a live
//! lease held by another agent makes `pre` exit with `BLOCKED`.

use crate::cli::HookStage;
use agentlock::context::LockContext;
use agentlock::error::{AgentLockError, Result};
use agentlock::gatekeeper::{Gatekeeper, HookInput, Verdict};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Run a hook stage on the JSON payload read from `input`.
pub fn cmd_hook<R: Read>(stage: HookStage, mut input: R) -> Result<()> {
    let mut raw = String::new();
    if let Err(e) = input.read_to_string(&mut raw) {
        warn!(error = %e, "failed to read hook input");
        eprintln!("Warning: failed to read hook input ({}); lock check skipped", e);
        return Ok(());
    }

    let hook_input = match HookInput::from_json(&raw) {
        Ok(hook_input) => hook_input,
        Err(e) => {
            warn!(error = %e, "unparseable hook input");
            eprintln!("Warning: {}; lock check skipped", e);
            return Ok(());
        }
    };

    let cwd = hook_cwd(&hook_input);
    let ctx = match LockContext::resolve_from(&cwd) {
        Ok(ctx) => ctx,
        Err(e) => {
            warn!(error = %e, "failed to resolve lock context");
            eprintln!("Warning: {}; lock check skipped", e);
            return Ok(());
        }
    };

    run_stage(&ctx, &cwd, stage, &hook_input)
}

/// Run a hook stage against an already-resolved context.
pub(crate) fn run_stage(
    ctx: &LockContext,
    cwd: &Path,
    stage: HookStage,
    hook_input: &HookInput,
) -> Result<()> {
    let gatekeeper = match Gatekeeper::from_context(ctx, cwd.to_path_buf()) {
        Ok(gatekeeper) => gatekeeper,
        Err(e) => {
            warn!(error = %e, "failed to build gatekeeper");
            eprintln!("Warning: {}; lock check skipped", e);
            return Ok(());
        }
    };

    match stage {
        HookStage::Pre => match gatekeeper.before_mutation(hook_input) {
            Verdict::Allow => Ok(()),
            Verdict::Warn { message } => {
                eprintln!("Warning: {}", message);
                Ok(())
            }
            Verdict::Block { reason } => Err(AgentLockError::LockDenied(reason)),
        },
        HookStage::Post => {
            gatekeeper.after_mutation(hook_input);
            Ok(())
        }
    }
}

/// The directory the hook runs for: the payload's `cwd`, else the process's.
fn hook_cwd(hook_input: &HookInput) -> PathBuf {
    match hook_input.cwd.as_deref() {
        Some(cwd) if !cwd.trim().is_empty() => PathBuf::from(cwd),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlock::config::Config;
    use agentlock::exit_codes;
    use agentlock::gatekeeper::ToolInput;
    use tempfile::TempDir;

    fn create_test_context() -> (TempDir, LockContext) {
        let temp_dir = TempDir::new().unwrap();
        let ctx = LockContext::with_config(temp_dir.path().join(".agentlock"), Config::default());
        (temp_dir, ctx)
    }

    fn edit_as(session: &str, cwd: &Path, file: &str) -> HookInput {
        HookInput {
            session_id: Some(session.to_string()),
            tool_name: Some("Edit".to_string()),
            tool_input: ToolInput {
                file_path: Some(file.to_string()),
                ..ToolInput::default()
            },
            cwd: Some(cwd.to_string_lossy().to_string()),
        }
    }

    #[test]
    fn garbage_input_fails_open() {
        assert!(cmd_hook(HookStage::Pre, "not json".as_bytes()).is_ok());
        assert!(cmd_hook(HookStage::Post, "".as_bytes()).is_ok());
    }

    #[test]
    fn pre_blocks_foreign_session_with_exit_code_two() {
        let (temp_dir, ctx) = create_test_context();
        let cwd = temp_dir.path();

        run_stage(&ctx, cwd, HookStage::Pre, &edit_as("s1", cwd, "src/x.go")).unwrap();
        let err = run_stage(&ctx, cwd, HookStage::Pre, &edit_as("s2", cwd, "src/x.go"))
            .unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::BLOCKED);
        assert!(err.to_string().contains("session-s1"));
    }

    #[test]
    fn post_releases_so_next_session_proceeds() {
        let (temp_dir, ctx) = create_test_context();
        let cwd = temp_dir.path();

        run_stage(&ctx, cwd, HookStage::Pre, &edit_as("s1", cwd, "src/x.go")).unwrap();
        run_stage(&ctx, cwd, HookStage::Post, &edit_as("s1", cwd, "src/x.go")).unwrap();

        assert!(run_stage(&ctx, cwd, HookStage::Pre, &edit_as("s2", cwd, "src/x.go")).is_ok());
    }

    #[test]
    fn post_by_non_owner_still_succeeds() {
        let (temp_dir, ctx) = create_test_context();
        let cwd = temp_dir.path();

        run_stage(&ctx, cwd, HookStage::Pre, &edit_as("s1", cwd, "src/x.go")).unwrap();

        assert!(run_stage(&ctx, cwd, HookStage::Post, &edit_as("s2", cwd, "src/x.go")).is_ok());
    }
}
