// SPDX-License-Identifier: MIT

//! Agent-boundary error taxonomy, mapped onto the shared [`scan_core::ErrorKind`].

use scan_core::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("container runtime not available: {0}")]
    RuntimeUnavailable(String),

    #[error("repository fetch failed: {0}")]
    Fetch(String),

    #[error("container execution failed: {0}")]
    Execution(String),

    #[error("failed to parse tool output: {0}")]
    Parse(String),

    #[error("agent operation timed out")]
    Timeout,

    #[error("agent was cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::RuntimeUnavailable(_) => ErrorKind::AgentFailure,
            AgentError::Fetch(_) => ErrorKind::AgentFailure,
            AgentError::Execution(_) => ErrorKind::AgentFailure,
            AgentError::Parse(_) => ErrorKind::AgentFailure,
            AgentError::Timeout => ErrorKind::Timeout,
            AgentError::Cancelled => ErrorKind::AgentFailure,
            AgentError::Io(_) => ErrorKind::Internal,
        }
    }
}
