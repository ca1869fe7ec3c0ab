// SPDX-License-Identifier: MIT

//! Software composition analysis: audits dependency manifests for known
//! vulnerable, outdated, unmaintained, or mis-licensed packages. Operates on
//! manifest files rather than source, so it is language-agnostic.

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
use crate::rules::{issue_to_finding, lookup_by_prefix, SCA_AUDIT_RULES};
use crate::scan_config::ScanConfig;
use crate::traits::Agent;
use crate::version::AgentVersion;

const AGENT_ID: &str = "agent-sca-audit";
const TOOL_NAME: &str = "dependency-audit";
const IMAGE: &str = "scan-agents/dependency-audit:latest";

pub struct DependencyAuditAgent<F, R> {
    fetcher: F,
    runner: R,
}

impl<F: RepoFetcher, R: ContainerRunner> DependencyAuditAgent<F, R> {
    pub fn new(fetcher: F, runner: R) -> Self {
        Self { fetcher, runner }
    }
}

#[async_trait]
impl<F: RepoFetcher + Send + Sync, R: ContainerRunner + Send + Sync> Agent for DependencyAuditAgent<F, R> {
    async fn scan(&self, cancel: CancellationToken, config: ScanConfig) -> AgentResult {
        run_container_scan(
            &cancel,
            &self.fetcher,
            &self.runner,
            &config,
            AGENT_ID,
            IMAGE,
            |_repo_path: &Path| vec!["audit".to_string(), "--format".to_string(), "json".to_string()],
            |stdout| {
                let parsed = parse_tool_json(stdout)?;
                Ok(parsed
                    .issues
                    .iter()
                    .map(|issue| {
                        let mapping = lookup_by_prefix(SCA_AUDIT_RULES, &issue.rule_id);
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
                Category::DependencyVuln,
                Category::OutdatedDeps,
                Category::SupplyChain,
                Category::LicenseIssue,
            ])
            .resource_caps(ResourceCaps::new(512, 0.5))
    }

    async fn version(&self) -> AgentVersion {
        let mut version = AgentVersion::new("1.0.0");
        if let Some(tool_version) = probe_tool_version(&self.runner, IMAGE).await {
            version = version.tool_version(tool_version);
        }
        version
    }
}
