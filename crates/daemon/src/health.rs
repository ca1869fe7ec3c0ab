// SPDX-License-Identifier: MIT

//! Aggregated health check (§6): store reachability, queue `stats()`
//! reachability, and each registered agent's `health_check()`. Exposed to
//! the CLI as `scanctl health`.

use std::sync::Arc;
use std::time::Duration;

use scan_agents::Agent;
use scan_queue::Queue;
use scan_store::Store;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Per-agent health probe timeout; a hung health check must not block the
/// rest of the report.
const AGENT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub store: bool,
    pub queue: bool,
    pub agents: Vec<(String, bool)>,
}

impl HealthReport {
    /// Whether every component reported healthy.
    pub fn is_healthy(&self) -> bool {
        self.store && self.queue && self.agents.iter().all(|(_, ok)| *ok)
    }
}

/// Run the full aggregate check.
pub async fn check(store: &Arc<dyn Store>, queue: &Queue, agents: &[Arc<dyn Agent>]) -> HealthReport {
    let store_ok = store.ping().await.is_ok();
    let queue_ok = queue.stats().await.is_ok();

    let mut agent_results = Vec::with_capacity(agents.len());
    for agent in agents {
        let name = agent.describe().name;
        let cancel = CancellationToken::new();
        let ok = tokio::time::timeout(AGENT_PROBE_TIMEOUT, agent.health_check(cancel))
            .await
            .map(|result| result.is_ok())
            .unwrap_or(false);
        agent_results.push((name, ok));
    }

    HealthReport { store: store_ok, queue: queue_ok, agents: agent_results }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_iff_every_component_is_healthy() {
        let report = HealthReport {
            store: true,
            queue: true,
            agents: vec![("pattern-engine".to_string(), true)],
        };
        assert!(report.is_healthy());
    }

    #[test]
    fn any_unhealthy_agent_fails_the_whole_report() {
        let report = HealthReport {
            store: true,
            queue: true,
            agents: vec![("pattern-engine".to_string(), true), ("dast-prober".to_string(), false)],
        };
        assert!(!report.is_healthy());
    }

    #[test]
    fn unreachable_store_fails_the_whole_report() {
        let report = HealthReport { store: false, queue: true, agents: vec![] };
        assert!(!report.is_healthy());
    }

    #[tokio::test]
    async fn check_aggregates_store_queue_and_agents() {
        use scan_agents::FakeContainerRunner;
        use scan_agents::FakeRepoFetcher;
        use scan_agents::PatternEngineAgent;
        use scan_queue::QueueConfig;
        use scan_store::InMemoryStore;

        let store: Arc<dyn Store> = Arc::new(InMemoryStore::default());
        let queue = Queue::new(store.clone(), QueueConfig::new("scan"));
        let agent: Arc<dyn Agent> =
            Arc::new(PatternEngineAgent::new(FakeRepoFetcher, FakeContainerRunner::new()));

        let report = check(&store, &queue, &[agent]).await;
        assert!(report.store);
        assert!(report.queue);
        assert_eq!(report.agents.len(), 1);
    }
}
