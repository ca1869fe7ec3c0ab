// SPDX-License-Identifier: MIT

//! Queue-boundary error taxonomy, mapped onto the shared [`scan_core::ErrorKind`].

use scan_core::ErrorKind;
use scan_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("job not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QueueError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueueError::Validation(_) => ErrorKind::Validation,
            QueueError::NotFound(_) => ErrorKind::NotFound,
            QueueError::Store(e) => e.kind(),
            QueueError::Serialization(_) => ErrorKind::Internal,
        }
    }
}
