//! Error types for agentlock.
//!
//! Uses thiserror for derive macros. Routine negative outcomes of lock
//! operations (denied, not held, not owner) are not errors; they are
//! variants of the outcome enums in [`crate::locks`].

use crate::exit_codes;
use thiserror::Error;

/// Main error type for agentlock operations.
#[derive(Error, Debug)]
pub enum AgentLockError {
    /// Invalid arguments, invalid configuration, or a refused request.
    #[error("{0}")]
    UserError(String),

    /// Storage could not be read or written (missing directory, permissions, disk full).
    #[error("I/O failure: {0}")]
    IoFailure(String),

    /// A stored lock record or journal line failed to parse.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A live lease owned by another agent blocks the operation.
    #[error("{0}")]
    LockDenied(String),
}

impl AgentLockError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            AgentLockError::UserError(_) => exit_codes::USER_ERROR,
            AgentLockError::IoFailure(_) => exit_codes::IO_FAILURE,
            AgentLockError::MalformedRecord(_) => exit_codes::IO_FAILURE,
            AgentLockError::LockDenied(_) => exit_codes::BLOCKED,
        }
    }

    /// Build an `IoFailure` from an I/O error and a short description of what failed.
    pub(crate) fn io(what: impl std::fmt::Display, err: std::io::Error) -> Self {
        AgentLockError::IoFailure(format!("{}: {}", what, err))
    }
}

/// Result type alias for agentlock operations.
pub type Result<T> = std::result::Result<T, AgentLockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = AgentLockError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn io_failure_has_correct_exit_code() {
        let err = AgentLockError::IoFailure("disk full".to_string());
        assert_eq!(err.exit_code(), exit_codes::IO_FAILURE);
    }

    #[test]
    fn malformed_record_has_correct_exit_code() {
        let err = AgentLockError::MalformedRecord("bad json".to_string());
        assert_eq!(err.exit_code(), exit_codes::IO_FAILURE);
    }

    #[test]
    fn lock_denied_blocks() {
        let err = AgentLockError::LockDenied("held by a1".to_string());
        assert_eq!(err.exit_code(), exit_codes::BLOCKED);
    }

    #[test]
    fn io_helper_includes_context() {
        let err = AgentLockError::io(
            "failed to open 'x'",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "I/O failure: failed to open 'x': denied");
    }
}
