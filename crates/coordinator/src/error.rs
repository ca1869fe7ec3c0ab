// SPDX-License-Identifier: MIT

//! Coordinator-boundary error taxonomy, mapped onto the shared [`scan_core::ErrorKind`].

use scan_core::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("scan request payload is invalid: {0}")]
    InvalidPayload(String),

    #[error("no agent is eligible for this scan request")]
    NoEligibleAgents,

    #[error("every selected agent failed")]
    AllAgentsFailed,
}

impl CoordinatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoordinatorError::InvalidPayload(_) => ErrorKind::Validation,
            CoordinatorError::NoEligibleAgents => ErrorKind::Validation,
            CoordinatorError::AllAgentsFailed => ErrorKind::AgentFailure,
        }
    }
}
