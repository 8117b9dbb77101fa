//! Agentlock CLI entry point.
//!
//! Parses arguments, sets up logging on stderr, dispatches to the command
//! handler, and maps errors to exit codes.

mod cli;
mod commands;

use agentlock::error::AgentLockError;
use agentlock::exit_codes;
use cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `agentlock=debug`).
const LOG_ENV_VAR: &str = "AGENTLOCK_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    // Stdout may carry hook output, so logs always go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging();

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // A denial is shown to the agent verbatim by the host tool.
            match err {
                AgentLockError::LockDenied(_) => eprintln!("{}", err),
                _ => eprintln!("Error: {}", err),
            }
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
