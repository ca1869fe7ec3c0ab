// SPDX-License-Identifier: MIT

//! Owns N [`Worker`]s in one process, fans `register_handler` out to all of
//! them, and coordinates start/stop.

use std::sync::Arc;

use scan_queue::{Queue, QueueError};

use crate::config::WorkerPoolConfig;
use crate::handler::JobHandler;
use crate::stats::WorkerStats;
use crate::worker::Worker;

/// A fixed-size pool of [`Worker`]s draining the same [`Queue`]. Multiple
/// `WorkerPool`s, in the same or different processes, may point at the same
/// queue — that's the normal production topology (§2 process topology).
pub struct WorkerPool {
    workers: Vec<Arc<Worker>>,
    config: WorkerPoolConfig,
}

impl WorkerPool {
    /// Build `config.num_workers` workers, each identified `<prefix>-<n>`,
    /// against `queue`.
    pub fn new(prefix: impl AsRef<str>, queue: Arc<Queue>, config: WorkerPoolConfig) -> Self {
        let prefix = prefix.as_ref();
        let workers = (0..config.num_workers.max(1))
            .map(|n| {
                Arc::new(Worker::new(
                    format!("{prefix}-{n}"),
                    Arc::clone(&queue),
                    config.worker.clone(),
                ))
            })
            .collect();
        Self { workers, config }
    }

    pub fn workers(&self) -> &[Arc<Worker>] {
        &self.workers
    }

    /// Register `handler` for `type_tag` on every worker in the pool. Do this
    /// before [`WorkerPool::start`].
    pub fn register_handler(&self, type_tag: impl Into<String>, handler: Arc<dyn JobHandler>) {
        let type_tag = type_tag.into();
        for worker in &self.workers {
            worker.register_handler(type_tag.clone(), Arc::clone(&handler));
        }
    }

    /// Start every worker's polling routines.
    pub fn start(&self) {
        for worker in &self.workers {
            worker.start();
        }
    }

    /// Stop accepting new jobs pool-wide and wait up to
    /// `config.shutdown_timeout` for every worker to drain. Each worker
    /// additionally enforces its own `shutdown_timeout`; the pool-level
    /// deadline is the outer bound across all of them running concurrently.
    pub async fn stop(&self) -> Result<(), QueueError> {
        let stops = self.workers.iter().map(|w| w.stop());
        let wait = futures::future::join_all(stops);

        match tokio::time::timeout(self.config.shutdown_timeout, wait).await {
            Ok(results) => results.into_iter().collect(),
            Err(_elapsed) => {
                tracing::warn!("worker pool shutdown timed out with workers still draining");
                Err(QueueError::Validation("worker pool shutdown timed out".to_string()))
            }
        }
    }

    /// Per-worker stats, in the same order as [`WorkerPool::workers`].
    pub fn stats(&self) -> Vec<(String, WorkerStats)> {
        self.workers.iter().map(|w| (w.id().to_string(), w.stats())).collect()
    }

    pub fn is_running(&self) -> bool {
        self.workers.iter().any(|w| w.is_running())
    }
}
