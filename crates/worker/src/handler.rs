// SPDX-License-Identifier: MIT

//! The contract a registered job type implements.

use async_trait::async_trait;
use scan_core::{AgentResult, Job};
use tokio_util::sync::CancellationToken;

/// Handles one job type end to end, returning an optional [`AgentResult`] on
/// success. Handlers are expected to honor `cancel` promptly: it fires when
/// the worker is shutting down or the job's own timeout elapses.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: Job, cancel: CancellationToken) -> Result<Option<AgentResult>, anyhow::Error>;
}
