// SPDX-License-Identifier: MIT

//! Language-agnostic SAST pattern-matching engine: scans source text for
//! known-dangerous constructs (string-built SQL, shell exec, unsanitized
//! path joins, weak hashes, unsafe deserialization).

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
use crate::rules::{issue_to_finding, lookup, SAST_PATTERN_RULES};
use crate::scan_config::ScanConfig;
use crate::traits::Agent;
use crate::version::AgentVersion;

const AGENT_ID: &str = "agent-sast-pattern";
const TOOL_NAME: &str = "pattern-engine";
const IMAGE: &str = "scan-agents/pattern-engine:latest";

/// Wraps an in-house, language-agnostic static pattern matcher.
pub struct PatternEngineAgent<F, R> {
    fetcher: F,
    runner: R,
}

impl<F: RepoFetcher, R: ContainerRunner> PatternEngineAgent<F, R> {
    pub fn new(fetcher: F, runner: R) -> Self {
        Self { fetcher, runner }
    }
}

#[async_trait]
impl<F: RepoFetcher + Send + Sync, R: ContainerRunner + Send + Sync> Agent for PatternEngineAgent<F, R> {
    async fn scan(&self, cancel: CancellationToken, config: ScanConfig) -> AgentResult {
        if !config.languages.is_empty()
            && !config.languages.iter().any(|l| self.describe().supports_language(l))
        {
            return AgentResult::completed(AGENT_ID, Duration::ZERO, Vec::new());
        }

        run_container_scan(
            &cancel,
            &self.fetcher,
            &self.runner,
            &config,
            AGENT_ID,
            IMAGE,
            |_repo_path: &Path| vec!["scan".to_string(), "--format".to_string(), "json".to_string()],
            |stdout| {
                let parsed = parse_tool_json(stdout)?;
                Ok(parsed
                    .issues
                    .iter()
                    .map(|issue| {
                        let mapping = lookup(SAST_PATTERN_RULES, &issue.rule_id);
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
            .supported_categories(vec![
                Category::SqlInjection,
                Category::CommandInjection,
                Category::PathTraversal,
                Category::InsecureCrypto,
                Category::InsecureDeserialization,
            ])
            .resource_caps(ResourceCaps::new(512, 1.0))
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

    fn agent() -> PatternEngineAgent<FakeRepoFetcher, FakeContainerRunner> {
        PatternEngineAgent::new(FakeRepoFetcher, FakeContainerRunner::new())
    }

    #[tokio::test]
    async fn maps_issues_through_the_rule_table() {
        let agent = agent();
        agent.runner.push_output(ContainerOutput {
            exit_code: 1,
            stdout: r#"{"issues":[{"rule_id":"sast-sql-concat","file":"app.py","line":12}]}"#.to_string(),
            stderr: String::new(),
        });

        let result = agent
            .scan(CancellationToken::new(), ScanConfig::new("https://example.com/repo.git"))
            .await;

        assert!(result.is_success());
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].category, Category::SqlInjection);
    }

    #[tokio::test]
    async fn wildcard_agent_runs_regardless_of_requested_language() {
        let agent = agent();
        agent.runner.push_output(ContainerOutput {
            exit_code: 0,
            stdout: r#"{"issues":[]}"#.to_string(),
            stderr: String::new(),
        });
        let config =
            ScanConfig::new("https://example.com/repo.git").languages(vec!["go".to_string()]);
        let result = agent.scan(CancellationToken::new(), config).await;
        assert!(result.is_success());
        assert_eq!(agent.runner.invocations.lock().len(), 1);
    }

    #[tokio::test]
    async fn version_probes_the_wrapped_tool_when_reachable() {
        let agent = agent();
        agent.runner.push_output(ContainerOutput {
            exit_code: 0,
            stdout: "pattern-engine 1.2.3".to_string(),
            stderr: String::new(),
        });
        let version = agent.version().await;
        assert_eq!(version.tool_version, "pattern-engine 1.2.3");
    }

    #[tokio::test]
    async fn version_falls_back_to_unknown_when_probe_fails() {
        let agent = agent();
        agent.runner.push_error("docker daemon not running");
        let version = agent.version().await;
        assert_eq!(version.tool_version, AgentVersion::UNKNOWN);
    }
}
