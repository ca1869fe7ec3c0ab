// SPDX-License-Identifier: MIT

//! JavaScript/TypeScript linter agent, restricted to those two languages —
//! the reference implementation of §4.3's language-gating rule.

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
use crate::rules::{issue_to_finding, lookup, JS_LINT_RULES};
use crate::scan_config::ScanConfig;
use crate::traits::Agent;
use crate::version::AgentVersion;

const AGENT_ID: &str = "agent-js-lint";
const TOOL_NAME: &str = "js-lint";
const IMAGE: &str = "scan-agents/js-lint:latest";
const SUPPORTED_LANGUAGES: [&str; 2] = ["javascript", "typescript"];

pub struct JsLintAgent<F, R> {
    fetcher: F,
    runner: R,
}

impl<F: RepoFetcher, R: ContainerRunner> JsLintAgent<F, R> {
    pub fn new(fetcher: F, runner: R) -> Self {
        Self { fetcher, runner }
    }

    /// Whether `config` targets at least one of this agent's languages,
    /// given an empty request language set means "no restriction".
    fn in_scope(&self, config: &ScanConfig) -> bool {
        config.languages.is_empty()
            || config.languages.iter().any(|l| self.describe().supports_language(l))
    }
}

#[async_trait]
impl<F: RepoFetcher + Send + Sync, R: ContainerRunner + Send + Sync> Agent for JsLintAgent<F, R> {
    async fn scan(&self, cancel: CancellationToken, config: ScanConfig) -> AgentResult {
        if !self.in_scope(&config) {
            return AgentResult::completed(AGENT_ID, Duration::ZERO, Vec::new());
        }

        run_container_scan(
            &cancel,
            &self.fetcher,
            &self.runner,
            &config,
            AGENT_ID,
            IMAGE,
            |_repo_path: &Path| vec!["lint".to_string(), "--format".to_string(), "json".to_string()],
            |stdout| {
                let parsed = parse_tool_json(stdout)?;
                Ok(parsed
                    .issues
                    .iter()
                    .map(|issue| {
                        let mapping = lookup(JS_LINT_RULES, &issue.rule_id);
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
            .supported_languages(SUPPORTED_LANGUAGES.iter().map(|s| s.to_string()).collect())
            .supported_categories(vec![Category::Xss, Category::CommandInjection, Category::Csrf, Category::Misconfiguration])
            .resource_caps(ResourceCaps::new(256, 0.5))
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

    fn agent() -> JsLintAgent<FakeRepoFetcher, FakeContainerRunner> {
        JsLintAgent::new(FakeRepoFetcher, FakeContainerRunner::new())
    }

    #[tokio::test]
    async fn disjoint_language_set_short_circuits_to_empty_completed() {
        let agent = agent();
        let config =
            ScanConfig::new("https://example.com/repo.git").languages(vec!["go".to_string()]);

        let result = agent.scan(CancellationToken::new(), config).await;

        assert!(result.is_success());
        assert!(result.findings.is_empty());
        assert!(agent.runner.invocations.lock().is_empty());
    }

    #[tokio::test]
    async fn matching_language_runs_the_container() {
        let agent = agent();
        agent.runner.push_output(ContainerOutput {
            exit_code: 1,
            stdout: r#"{"issues":[{"rule_id":"no-eval","file":"index.js","line":3}]}"#.to_string(),
            stderr: String::new(),
        });
        let config = ScanConfig::new("https://example.com/repo.git")
            .languages(vec!["javascript".to_string()]);

        let result = agent.scan(CancellationToken::new(), config).await;

        assert!(result.is_success());
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].category, Category::CommandInjection);
    }

    #[tokio::test]
    async fn empty_language_set_means_no_restriction() {
        let agent = agent();
        agent.runner.push_output(ContainerOutput {
            exit_code: 0,
            stdout: r#"{"issues":[]}"#.to_string(),
            stderr: String::new(),
        });
        let result = agent
            .scan(CancellationToken::new(), ScanConfig::new("https://example.com/repo.git"))
            .await;
        assert!(result.is_success());
        assert_eq!(agent.runner.invocations.lock().len(), 1);
    }

    #[tokio::test]
    async fn version_probes_the_wrapped_tool_when_reachable() {
        let agent = agent();
        agent.runner.push_output(ContainerOutput {
            exit_code: 0,
            stdout: "js-lint 2.0.1".to_string(),
            stderr: String::new(),
        });
        let version = agent.version().await;
        assert_eq!(version.tool_version, "js-lint 2.0.1");
    }
}
