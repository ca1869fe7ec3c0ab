// SPDX-License-Identifier: MIT

//! Shared error taxonomy.
//!
//! Every crate in the workspace defines its own `thiserror` error enum for
//! its own boundary, but each maps its variants onto this shared
//! [`ErrorKind`] so callers several layers away (the daemon's health check,
//! the CLI's exit code) can react without matching on crate-specific types.

/// Coarse classification of an error, independent of which crate produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-supplied input failed validation.
    Validation,
    /// The referenced entity does not exist.
    NotFound,
    /// An operation could not complete within its allotted time.
    Timeout,
    /// A scan agent failed to execute or returned an unusable result.
    AgentFailure,
    /// An internal invariant was violated or a dependency misbehaved.
    Internal,
    /// The error is unrecoverable; the process should not continue.
    Fatal,
}

crate::simple_display! {
    ErrorKind {
        Validation => "validation",
        NotFound => "not_found",
        Timeout => "timeout",
        AgentFailure => "agent_failure",
        Internal => "internal",
        Fatal => "fatal",
    }
}

/// Errors that can occur manipulating `scan-core` domain types directly
/// (job construction, finding ID derivation).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::Serialization(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_displays_as_snake_case() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(ErrorKind::AgentFailure.to_string(), "agent_failure");
    }

    #[test]
    fn validation_error_kind() {
        let err = CoreError::Validation("bad input".into());
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
