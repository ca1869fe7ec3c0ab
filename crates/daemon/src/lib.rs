// SPDX-License-Identifier: MIT

//! The scan orchestration daemon: process wiring for the priority queue,
//! worker pool, scan coordinator, alert dispatcher, and health checks.
//! Exposed as a library so `scanctl` and integration tests can build the
//! same `Store`/`Queue` from the same configuration without going through
//! `main()`.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod alert;
pub mod config;
pub mod health;
pub mod logging;
pub mod role;

use std::sync::Arc;

use scan_agents::{Agent, DockerContainerRunner, GitRepoFetcher};
use scan_queue::Queue;
use scan_store::{InMemoryStore, RedisStore, Store, StoreError};

/// Build the configured [`Store`] implementor: Redis by default, or an
/// in-process store when `SCAN_STORE_BACKEND=memory` (single-binary /
/// development mode).
pub async fn build_store() -> Result<Arc<dyn Store>, StoreError> {
    if config::store_backend_is_memory() {
        return Ok(Arc::new(InMemoryStore::default()));
    }
    let store = RedisStore::connect(&config::store_config()).await?;
    Ok(Arc::new(store))
}

/// Build the five default agents, each wired to the production
/// `git`/`docker` capability implementations.
pub fn build_agents() -> Vec<Arc<dyn Agent>> {
    scan_agents::default_agents(GitRepoFetcher::new(), DockerContainerRunner::new())
}

/// Build the named queue over `store`.
pub fn build_queue(store: Arc<dyn Store>) -> Arc<Queue> {
    Arc::new(Queue::new(store, config::queue_config()))
}
