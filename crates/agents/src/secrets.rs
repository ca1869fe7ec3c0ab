// SPDX-License-Identifier: MIT

//! Secrets detection: scans tracked files for hardcoded credentials,
//! private keys, and high-entropy strings. Language-agnostic.

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
use crate::rules::{issue_to_finding, lookup, SECRETS_RULES};
use crate::scan_config::ScanConfig;
use crate::traits::Agent;
use crate::version::AgentVersion;

const AGENT_ID: &str = "agent-secrets";
const TOOL_NAME: &str = "secret-scanner";
const IMAGE: &str = "scan-agents/secret-scanner:latest";

pub struct SecretScannerAgent<F, R> {
    fetcher: F,
    runner: R,
}

impl<F: RepoFetcher, R: ContainerRunner> SecretScannerAgent<F, R> {
    pub fn new(fetcher: F, runner: R) -> Self {
        Self { fetcher, runner }
    }
}

#[async_trait]
impl<F: RepoFetcher + Send + Sync, R: ContainerRunner + Send + Sync> Agent for SecretScannerAgent<F, R> {
    async fn scan(&self, cancel: CancellationToken, config: ScanConfig) -> AgentResult {
        run_container_scan(
            &cancel,
            &self.fetcher,
            &self.runner,
            &config,
            AGENT_ID,
            IMAGE,
            |_repo_path: &Path| vec!["scan".to_string(), "--redact".to_string()],
            |stdout| {
                let parsed = parse_tool_json(stdout)?;
                Ok(parsed
                    .issues
                    .iter()
                    .map(|issue| {
                        let mapping = lookup(SECRETS_RULES, &issue.rule_id);
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
            .supported_categories(vec![Category::HardcodedSecrets])
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

    #[tokio::test]
    async fn private_key_block_is_high_confidence() {
        let agent = SecretScannerAgent::new(FakeRepoFetcher, FakeContainerRunner::new());
        agent.runner.push_output(ContainerOutput {
            exit_code: 1,
            stdout: r#"{"issues":[{"rule_id":"private-key-block","file":"id_rsa","line":1}]}"#
                .to_string(),
            stderr: String::new(),
        });

        let result = agent
            .scan(CancellationToken::new(), ScanConfig::new("https://example.com/repo.git"))
            .await;

        assert!(result.is_success());
        assert!(result.findings[0].confidence > 0.9);
        assert_eq!(result.findings[0].category, Category::HardcodedSecrets);
    }

    #[tokio::test]
    async fn version_probes_the_wrapped_tool_when_reachable() {
        let agent = SecretScannerAgent::new(FakeRepoFetcher, FakeContainerRunner::new());
        agent.runner.push_output(ContainerOutput {
            exit_code: 0,
            stdout: "secret-scanner 3.1.0".to_string(),
            stderr: String::new(),
        });
        let version = agent.version().await;
        assert_eq!(version.tool_version, "secret-scanner 3.1.0");
    }
}
