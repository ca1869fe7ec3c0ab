// SPDX-License-Identifier: MIT

//! Dynamic probing: builds and boots the application from source inside the
//! container, then probes the running instance for missing security
//! headers, reflected input, and auth-bypass patterns. Heavier and slower
//! than the static agents, so it gets a longer default timeout.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use scan_core::{AgentDescriptor, AgentResult, Category, ResourceCaps};
use tokio_util::sync::CancellationToken;

use crate::container::ContainerRunner;
use crate::error::AgentError;
use crate::fetcher::RepoFetcher;
use crate::parse::parse_tool_json;
use crate::recipe::{probe_tool_version, run_container_scan};
use crate::rules::{issue_to_finding, lookup, DAST_RULES};
use crate::scan_config::ScanConfig;
use crate::traits::Agent;
use crate::version::AgentVersion;

const AGENT_ID: &str = "agent-dast-prober";
const TOOL_NAME: &str = "dast-prober";
const IMAGE: &str = "scan-agents/dast-prober:latest";

pub struct DastProberAgent<F, R> {
    fetcher: F,
    runner: R,
}

impl<F: RepoFetcher, R: ContainerRunner> DastProberAgent<F, R> {
    pub fn new(fetcher: F, runner: R) -> Self {
        Self { fetcher, runner }
    }
}

#[async_trait]
impl<F: RepoFetcher + Send + Sync, R: ContainerRunner + Send + Sync> Agent for DastProberAgent<F, R> {
    async fn scan(&self, cancel: CancellationToken, config: ScanConfig) -> AgentResult {
        run_container_scan(
            &cancel,
            &self.fetcher,
            &self.runner,
            &config,
            AGENT_ID,
            IMAGE,
            |_repo_path: &Path| vec!["build-and-probe".to_string(), "--format".to_string(), "json".to_string()],
            |stdout| {
                let parsed = parse_tool_json(stdout)?;
                Ok(parsed
                    .issues
                    .iter()
                    .map(|issue| {
                        let mapping = lookup(DAST_RULES, &issue.rule_id);
                        issue_to_finding(AGENT_ID, TOOL_NAME, mapping, issue)
                    })
                    .collect())
            },
        )
        .await
    }

    async fn health_check(&self, cancel: CancellationToken) -> Result<(), AgentError> {
        let outcome = self
            .runner
            .run(
                crate::container::ContainerSpec::new(IMAGE, "/")
                    .command(vec!["--version".to_string()])
                    .timeout(Duration::from_secs(10)),
            )
            .await;
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }
        outcome.map(|_| ())
    }

    fn describe(&self) -> AgentDescriptor {
        AgentDescriptor::new(AGENT_ID, "1.0.0")
            .supported_languages(vec!["*".to_string()])
            .supported_categories(vec![Category::Misconfiguration, Category::Xss, Category::AuthBypass])
            .default_timeout(Duration::from_secs(600))
            .resource_caps(ResourceCaps::new(1024, 2.0))
    }

    async fn version(&self) -> AgentVersion {
        let mut version = AgentVersion::new("1.0.0");
        if let Some(tool_version) = probe_tool_version(&self.runner, IMAGE).await {
            version = version.tool_version(tool_version);
        }
        version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ContainerOutput, FakeContainerRunner};
    use crate::fetcher::FakeRepoFetcher;

    #[tokio::test]
    async fn probe_findings_map_to_auth_bypass_category() {
        let agent = DastProberAgent::new(FakeRepoFetcher, FakeContainerRunner::new());
        agent.runner.push_output(ContainerOutput {
            exit_code: 1,
            stdout: r#"{"issues":[{"rule_id":"auth-bypass-probe","file":"routes/admin","line":0}]}"#
                .to_string(),
            stderr: String::new(),
        });

        let result = agent
            .scan(CancellationToken::new(), ScanConfig::new("https://example.com/repo.git"))
            .await;

        assert!(result.is_success());
        assert_eq!(result.findings[0].category, Category::AuthBypass);
    }

    #[test]
    fn default_timeout_is_longer_than_static_agents() {
        let agent = DastProberAgent::new(FakeRepoFetcher, FakeContainerRunner::new());
        assert_eq!(agent.describe().default_timeout, Duration::from_secs(600));
    }

    #[tokio::test]
    async fn version_falls_back_to_unknown_when_probe_fails() {
        let agent = DastProberAgent::new(FakeRepoFetcher, FakeContainerRunner::new());
        agent.runner.push_error("docker daemon not running");
        let version = agent.version().await;
        assert_eq!(version.tool_version, AgentVersion::UNKNOWN);
    }
}
