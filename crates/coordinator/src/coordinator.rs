// SPDX-License-Identifier: MIT

//! The "scan" job handler (§4.4): load the request, select agents, fan out
//! concurrently under a per-scan deadline, consolidate, and report success
//! iff at least one agent completed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use scan_agents::Agent;
use scan_core::{AgentResult, Job};
use scan_worker::JobHandler;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::CoordinatorError;
use crate::request::{build_scan_config, effective_deadline, load_scan_request};
use crate::selection::select_agents;

/// Grace period granted to an agent to observe cancellation before the
/// coordinator forcibly aborts its task (§4.3: "must observe ctx
/// cancellation within a bounded grace (≤ few seconds)").
const CANCEL_GRACE: Duration = Duration::from_secs(5);

/// Fans one [`scan_core::ScanRequest`] out across every eligible registered
/// [`Agent`] and consolidates their [`AgentResult`]s. Registered as the
/// handler for job type `"scan"`.
pub struct ScanCoordinator {
    agents: Vec<Arc<dyn Agent>>,
}

impl ScanCoordinator {
    pub fn new(agents: Vec<Arc<dyn Agent>>) -> Self {
        Self { agents }
    }

    /// Run the fan-out for one already-loaded request and return the
    /// consolidated result, independent of job bookkeeping. Exposed so the
    /// CLI/tests can drive a scan without constructing a [`Job`].
    #[instrument(level = "info", skip(self, cancel), fields(repo_url = %request.repo_url))]
    pub async fn run(
        &self,
        request: scan_core::ScanRequest,
        job_timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<AgentResult, CoordinatorError> {
        let deadline = effective_deadline(job_timeout, request.timeout);
        let selected = select_agents(&self.agents, &request);
        if selected.is_empty() {
            return Err(CoordinatorError::NoEligibleAgents);
        }

        let consolidated = fan_out(&request, &selected, deadline, cancel).await;
        if consolidated.sub_results.iter().any(AgentResult::is_success) {
            Ok(consolidated)
        } else {
            Err(CoordinatorError::AllAgentsFailed)
        }
    }
}

#[async_trait]
impl JobHandler for ScanCoordinator {
    #[instrument(level = "info", skip(self, job, cancel), fields(job_id = %job.id))]
    async fn handle(&self, job: Job, cancel: CancellationToken) -> Result<Option<AgentResult>, anyhow::Error> {
        let request = load_scan_request(&job)?;
        let result = self.run(request, job.metadata.timeout, cancel).await?;
        Ok(Some(result))
    }
}

/// Spawn one task per selected agent, wait for all of them (or the
/// deadline), and build the consolidated [`AgentResult`]: one `sub_result`
/// per agent (§4.4 step 6) plus the flat union of their findings with
/// origin-agent attribution preserved on each [`scan_core::Finding`].
async fn fan_out(
    request: &scan_core::ScanRequest,
    agents: &[Arc<dyn Agent>],
    deadline: Duration,
    cancel: CancellationToken,
) -> AgentResult {
    let start = Instant::now();
    let deadline_cancel = CancellationToken::new();

    let timer = {
        let deadline_cancel = deadline_cancel.clone();
        let parent_cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(deadline) => {}
                () = parent_cancel.cancelled() => {}
            }
            deadline_cancel.cancel();
        })
    };

    let mut agent_names = Vec::with_capacity(agents.len());
    let mut set: JoinSet<(String, AgentResult)> = JoinSet::new();
    for agent in agents {
        let agent = Arc::clone(agent);
        let name = agent.describe().name;
        agent_names.push(name.clone());
        let config = build_scan_config(request, &agent.describe(), deadline);
        let agent_cancel = deadline_cancel.child_token();
        set.spawn(async move {
            let result = agent.scan(agent_cancel, config).await;
            (name, result)
        });
    }

    let mut sub_results = Vec::with_capacity(agents.len());
    let drain = async {
        while let Some(joined) = set.join_next().await {
            if let Ok((name, result)) = joined {
                tracing::debug!(agent = %name, status = %result.status, "agent finished");
                sub_results.push(result);
            }
        }
    };

    if tokio::time::timeout(deadline + CANCEL_GRACE, drain).await.is_err() {
        tracing::warn!("scan deadline exceeded grace period, aborting remaining agents");
        set.abort_all();
        while set.join_next().await.is_some() {}
    }
    timer.abort();

    let completed: std::collections::HashSet<&str> =
        sub_results.iter().map(|r| r.agent_id.as_str()).collect();
    for name in &agent_names {
        if !completed.contains(name.as_str()) {
            sub_results.push(AgentResult::failed(name.clone(), start.elapsed(), "cancelled"));
        }
    }

    let findings = sub_results.iter().flat_map(|r| r.findings.clone()).collect();
    AgentResult::completed("scan-coordinator", start.elapsed(), findings).sub_results(sub_results)
}
