// SPDX-License-Identifier: MIT

//! Construction-time configuration for a [`crate::Queue`].

use std::time::Duration;

/// Parameters for a single named queue. A `Queue` is constructed from any
/// `Store` implementor plus one of these.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Queue name; namespaces every key this queue touches.
    pub name: String,
    pub default_timeout: Duration,
    pub retry_delay: Duration,
    pub cleanup_interval: Duration,
    /// Retention applied to job and result records.
    pub retention: Duration,
    /// Upper bound on keys scanned by `list()`; not enforced on enqueue/dequeue.
    pub max_list_scan: usize,
}

impl QueueConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_timeout: Duration::from_secs(600),
            retry_delay: Duration::from_secs(30),
            cleanup_interval: Duration::from_secs(3600),
            retention: Duration::from_secs(24 * 3600),
            max_list_scan: 10_000,
        }
    }
}
