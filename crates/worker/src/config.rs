// SPDX-License-Identifier: MIT

//! Construction-time configuration for a [`crate::Worker`] and a
//! [`crate::WorkerPool`].

use std::time::Duration;

/// Parameters for a single [`crate::Worker`].
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of cooperative polling routines this worker runs.
    pub concurrency: usize,
    /// How long a routine sleeps between dequeue attempts after an empty
    /// or errored poll.
    pub poll_interval: Duration,
    /// How long `Worker::stop` waits for in-flight dispatches to finish
    /// before giving up and leaving them for a later lease reclaim.
    pub shutdown_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            poll_interval: Duration::from_millis(200),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Parameters for a [`crate::WorkerPool`] of `num_workers` [`crate::Worker`]s.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    pub num_workers: usize,
    pub shutdown_timeout: Duration,
    pub worker: WorkerConfig,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            num_workers: 1,
            shutdown_timeout: Duration::from_secs(60),
            worker: WorkerConfig::default(),
        }
    }
}
