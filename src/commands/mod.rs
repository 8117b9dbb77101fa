//! Command implementations for agentlock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Handlers take an explicit [`LockContext`] so they can
//! run against any state root.

mod hook;
mod journal;
mod lock;

use crate::cli::{
    AcquireArgs, Command, HookCommand, LockAction, LockCommand, ReleaseArgs, WhoamiArgs,
};
use agentlock::config::{MAX_LEASE_DURATION_SECS, lease_duration_from_secs};
use agentlock::context::LockContext;
use agentlock::error::{AgentLockError, Result};
use agentlock::gatekeeper::normalize_lexically;
use agentlock::identity::{IdentitySource, resolve_agent_id};
use agentlock::locks::{AcquireOutcome, AcquireRequest, GrantKind, LockCoordinator, ReleaseOutcome};
use std::env;
use std::path::{Path, PathBuf};

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Hook(HookCommand { stage }) => hook::cmd_hook(stage, std::io::stdin().lock()),
        Command::Acquire(args) => cmd_acquire(&LockContext::resolve()?, &current_dir()?, args),
        Command::Release(args) => cmd_release(&LockContext::resolve()?, &current_dir()?, args),
        Command::Lock(lock_cmd) => {
            dispatch_lock(&LockContext::resolve()?, &current_dir()?, lock_cmd)
        }
        Command::Journal(args) => journal::cmd_journal(&LockContext::resolve()?, args),
        Command::Whoami(args) => cmd_whoami(args),
    }
}

/// Dispatch lock subcommands.
fn dispatch_lock(ctx: &LockContext, cwd: &Path, lock_cmd: LockCommand) -> Result<()> {
    match lock_cmd.action {
        LockAction::List => lock::cmd_lock_list(ctx),
        LockAction::Cleanup => lock::cmd_lock_cleanup(ctx),
        LockAction::Clear(args) => lock::cmd_lock_clear(ctx, cwd, args),
        LockAction::ReleaseAgent(args) => lock::cmd_lock_release_agent(ctx, args),
    }
}

fn current_dir() -> Result<PathBuf> {
    env::current_dir().map_err(|e| {
        AgentLockError::UserError(format!("failed to get current working directory: {}", e))
    })
}

/// Resolve a user-supplied path the same way the hook does, so the CLI and
/// the hook derive the same resource key for the same file.
pub(crate) fn resource_path(raw: &str, cwd: &Path) -> String {
    normalize_lexically(&cwd.join(raw)).to_string_lossy().to_string()
}

/// The agent id to act as: `explicit` if given, otherwise resolved.
fn agent_id(explicit: Option<String>, session: Option<&str>) -> String {
    explicit
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| resolve_agent_id(&IdentitySource::from_env(session)))
}

fn cmd_acquire(ctx: &LockContext, cwd: &Path, args: AcquireArgs) -> Result<()> {
    let path = resource_path(&args.path, cwd);
    let agent = agent_id(args.agent, args.session.as_deref());
    let coordinator = LockCoordinator::from_context(ctx);

    let mut req = AcquireRequest::new(&path, &agent, &args.operation)
        .with_session(args.session.as_deref());
    if let Some(secs) = args.lease_secs {
        if secs == 0 || secs > MAX_LEASE_DURATION_SECS {
            return Err(AgentLockError::UserError(format!(
                "--lease-secs must be between 1 and {}",
                MAX_LEASE_DURATION_SECS
            )));
        }
        req = req.with_lease(lease_duration_from_secs(secs));
    }

    match coordinator.acquire(&req)? {
        AcquireOutcome::Granted(grant) => {
            let verb = match grant.kind {
                GrantKind::Created => "Acquired",
                GrantKind::Reentered => "Already held",
            };
            println!("{}: {}", verb, grant.record.resource_path);
            println!("  Agent:      {}", grant.record.owner_agent_id);
            println!("  Operation:  {}", grant.record.operation);
            println!(
                "  Expires:    {}",
                grant.record.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("  Lock ID:    {}", grant.record.lock_id);
            Ok(())
        }
        AcquireOutcome::DeniedBy(info) => Err(AgentLockError::LockDenied(info.to_string())),
    }
}

fn cmd_release(ctx: &LockContext, cwd: &Path, args: ReleaseArgs) -> Result<()> {
    let path = resource_path(&args.path, cwd);
    let agent = agent_id(args.agent, None);
    let coordinator = LockCoordinator::from_context(ctx);

    match coordinator.release(&path, &agent)? {
        ReleaseOutcome::Released => {
            println!("Released: {}", path);
            Ok(())
        }
        ReleaseOutcome::NotHeld => {
            println!("No lease held on {}", path);
            Ok(())
        }
        ReleaseOutcome::NotOwner { owner_agent_id } => Err(AgentLockError::UserError(format!(
            "'{}' is leased by agent {}, not {}.\n\n\
             To clear it anyway, run:\n  agentlock lock clear {} --force",
            path, owner_agent_id, agent, path
        ))),
    }
}

fn cmd_whoami(args: WhoamiArgs) -> Result<()> {
    println!("{}", agent_id(None, args.session.as_deref()));
    Ok(())
}
