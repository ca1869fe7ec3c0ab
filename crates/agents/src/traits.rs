// SPDX-License-Identifier: MIT

//! The `Agent` capability contract (§4.3): every scanner wrapper, whatever
//! tool it shells out to, implements this.

use async_trait::async_trait;
use scan_core::{AgentDescriptor, AgentResult};
use tokio_util::sync::CancellationToken;

use crate::error::AgentError;
use crate::scan_config::ScanConfig;
use crate::version::AgentVersion;

/// A normalized wrapper around one external scanning tool.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Idempotent modulo filesystem side effects (every call uses a fresh
    /// scratch directory). Suspends on repo fetch and container exec but
    /// must observe `cancel` within a bounded grace period.
    async fn scan(&self, cancel: CancellationToken, config: ScanConfig) -> AgentResult;

    /// Verifies the container runtime is reachable and the agent's image is
    /// pullable; may pull on first call.
    async fn health_check(&self, cancel: CancellationToken) -> Result<(), AgentError>;

    /// Static capabilities: name, supported languages/categories, resource
    /// caps, default timeout.
    fn describe(&self) -> AgentDescriptor;

    /// The agent's own version plus the wrapped tool's; fields default to
    /// `"unknown"` if their probe fails.
    async fn version(&self) -> AgentVersion;
}
