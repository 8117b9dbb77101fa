//! Exit code constants for the agentlock CLI.
//!
//! - 0: Success (for hooks: allow the operation)
//! - 1: User error (bad args, invalid config)
//! - 2: Blocked (the resource is leased by another agent)
//! - 3: Storage failure (lock or activity directory unusable)
//!
//! Exit code 2 is the value the host tool's hook protocol reads as
//! "block the operation and show stderr to the agent".

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid config, or refused administrative action.
pub const USER_ERROR: i32 = 1;

/// The guarded operation must not proceed: another agent holds a live lease.
pub const BLOCKED: i32 = 2;

/// Lock store or activity journal could not be read or written.
pub const IO_FAILURE: i32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, BLOCKED, IO_FAILURE];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn blocked_matches_hook_protocol() {
        assert_eq!(SUCCESS, 0);
        assert_eq!(BLOCKED, 2);
    }
}
