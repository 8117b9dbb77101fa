//! CLI argument parsing for agentlock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};

/// Agentlock: lease-based advisory locks for agents sharing a filesystem.
///
/// Agents lease a file before mutating it and release it afterwards:
/// - Leases lapse on their own after the configured duration
/// - A live lease held by another agent blocks the mutation
/// - Every lock event is appended to an activity journal
#[derive(Parser, Debug)]
#[command(name = "agentlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for agentlock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Host tool hooks. Read the hook payload as JSON on stdin.
    Hook(HookCommand),

    /// Acquire a lease on a path.
    ///
    /// Exits with code 2 if another agent holds a live lease.
    Acquire(AcquireArgs),

    /// Release a lease held by an agent.
    Release(ReleaseArgs),

    /// Lock management commands.
    ///
    /// List, sweep, or clear leases.
    Lock(LockCommand),

    /// Show recent activity journal entries.
    Journal(JournalArgs),

    /// Print the agent id this process resolves to.
    Whoami(WhoamiArgs),
}

/// Hook subcommands.
#[derive(Parser, Debug)]
pub struct HookCommand {
    #[command(subcommand)]
    pub stage: HookStage,
}

/// When the hook runs relative to the mutation.
#[derive(Subcommand, Debug)]
pub enum HookStage {
    /// Before a mutation: acquire the lease or block.
    Pre,

    /// After a mutation: record it and release the lease.
    Post,
}

/// Arguments for the `acquire` command.
#[derive(Parser, Debug)]
pub struct AcquireArgs {
    /// Path of the resource to lease.
    pub path: String,

    /// Agent id to acquire as. Defaults to the resolved agent id.
    #[arg(long)]
    pub agent: Option<String>,

    /// Operation recorded on the lease.
    #[arg(long, default_value = "editing")]
    pub operation: String,

    /// Session id to record (and derive the agent id from).
    #[arg(long)]
    pub session: Option<String>,

    /// Lease length in seconds. Defaults to the configured duration.
    #[arg(long)]
    pub lease_secs: Option<u64>,
}

/// Arguments for the `release` command.
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    /// Path of the leased resource.
    pub path: String,

    /// Agent id to release as. Defaults to the resolved agent id.
    #[arg(long)]
    pub agent: Option<String>,
}

/// Lock subcommands.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// List all stored leases, live and expired.
    List,

    /// Delete every expired lease.
    Cleanup,

    /// Clear the lease on a path regardless of owner.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(LockClearArgs),

    /// Release every lease held by an agent.
    ReleaseAgent(ReleaseAgentArgs),
}

/// Arguments for the `lock clear` command.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// Path whose lease should be cleared.
    pub path: String,

    /// Force clearing the lease (required for safety).
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `lock release-agent` command.
#[derive(Parser, Debug)]
pub struct ReleaseAgentArgs {
    /// Agent whose leases should be released.
    pub agent: String,
}

/// Arguments for the `journal` command.
#[derive(Parser, Debug)]
pub struct JournalArgs {
    /// Show only the last N matching entries.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Show only entries attributed to this agent.
    #[arg(long)]
    pub agent: Option<String>,
}

/// Arguments for the `whoami` command.
#[derive(Parser, Debug)]
pub struct WhoamiArgs {
    /// Resolve as if running under this session id.
    #[arg(long)]
    pub session: Option<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
