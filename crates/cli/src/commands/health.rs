// SPDX-License-Identifier: MIT

//! `scanctl health` — aggregate store/queue/agent reachability.

use std::sync::Arc;

use anyhow::Result;
use scan_agents::Agent;
use scan_daemon::health;
use scan_queue::Queue;
use scan_store::Store;

use crate::output::{render, OutputFormat};

pub async fn run(
    store: &Arc<dyn Store>,
    queue: &Queue,
    agents: &[Arc<dyn Agent>],
    format: OutputFormat,
) -> Result<()> {
    let report = health::check(store, queue, agents).await;
    let healthy = report.is_healthy();
    render(format, &report, move |report| {
        let agents = report
            .agents
            .iter()
            .map(|(name, ok)| format!("{name}={}", if *ok { "ok" } else { "unhealthy" }))
            .collect::<Vec<_>>()
            .join(" ");
        format!("store={} queue={} {agents}", report.store, report.queue)
    });
    if !healthy {
        anyhow::bail!("one or more components are unhealthy");
    }
    Ok(())
}
