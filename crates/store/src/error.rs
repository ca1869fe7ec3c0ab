// SPDX-License-Identifier: MIT

//! Store-boundary error taxonomy, mapped onto the shared [`scan_core::ErrorKind`].

use scan_core::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store command failed: {0}")]
    Command(#[from] redis::RedisError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("store operation timed out")]
    Timeout,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Connection(_) => ErrorKind::Fatal,
            StoreError::Command(_) => ErrorKind::Internal,
            StoreError::Serialization(_) => ErrorKind::Internal,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Timeout => ErrorKind::Timeout,
        }
    }
}
