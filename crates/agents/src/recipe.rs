// SPDX-License-Identifier: MIT

//! The common execution recipe shared by every container-based agent
//! (§4.3 steps 1-7): scratch dir, fetch, compose invocation, execute with a
//! deadline, treat exit 0/1 as success, parse, return an `AgentResult`.

use std::path::Path;
use std::time::Duration;

use scan_core::{AgentResult, Finding};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::container::{ContainerRunner, ContainerSpec, Mount};
use crate::error::AgentError;
use crate::fetcher::RepoFetcher;
use crate::scan_config::ScanConfig;

/// Run one container-based agent's scan end to end.
///
/// `build_command` composes the tool invocation given the scratch
/// directory's path; `parse` turns a successful [`crate::container::ContainerOutput`]
/// into normalized [`Finding`]s. Any failure along the way (fetch, exec,
/// non-{0,1} exit, parse, cancellation) is folded into a `Failed`
/// `AgentResult` per the failure policy in §4.3.
pub async fn run_container_scan<P, F>(
    cancel: &CancellationToken,
    fetcher: &dyn RepoFetcher,
    runner: &dyn ContainerRunner,
    config: &ScanConfig,
    agent_id: &str,
    image: &str,
    build_command: P,
    parse: F,
) -> AgentResult
where
    P: FnOnce(&Path) -> Vec<String>,
    F: FnOnce(&str) -> Result<Vec<Finding>, AgentError>,
{
    let start = std::time::Instant::now();

    if cancel.is_cancelled() {
        return AgentResult::failed(agent_id, start.elapsed(), "cancelled");
    }

    let repo =
        match fetcher.fetch(&config.repo_url, config.git_ref.as_deref(), config.commit.as_deref()).await
        {
            Ok(repo) => repo,
            Err(err) => return AgentResult::failed(agent_id, start.elapsed(), err.to_string()),
        };

    let output_dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => return AgentResult::failed(agent_id, start.elapsed(), err.to_string()),
    };

    let command = build_command(repo.path());
    let spec = ContainerSpec::new(image, "/repo")
        .mounts(vec![
            Mount::read_only(repo.path(), "/repo"),
            Mount::read_write(output_dir.path(), "/output"),
        ])
        .command(command)
        .resource_caps(config.resource_caps)
        .timeout(config.timeout);

    let outcome = tokio::select! {
        res = runner.run(spec) => res,
        () = cancel.cancelled() => Err(AgentError::Cancelled),
    };

    let output = match outcome {
        Ok(output) => output,
        Err(err) => return AgentResult::failed(agent_id, start.elapsed(), err.to_string()),
    };

    if !output.is_success() {
        return AgentResult::failed(
            agent_id,
            start.elapsed(),
            format!("scanner exited {}: {}", output.exit_code, output.stderr.trim()),
        );
    }

    match parse(&output.stdout) {
        Ok(findings) => {
            let mut result = AgentResult::completed(agent_id, start.elapsed(), findings);
            result.tool_metadata.exit_code = Some(output.exit_code);
            result
        }
        Err(err) => AgentResult::failed(agent_id, start.elapsed(), err.to_string()),
    }
}

/// Probe the wrapped tool's own version by invoking it with `--version`
/// inside its container. Returns `None` on any failure (runtime
/// unavailable, non-zero exit, empty output), leaving the caller to fall
/// back to `AgentVersion`'s `"unknown"` default.
pub async fn probe_tool_version(runner: &dyn ContainerRunner, image: &str) -> Option<String> {
    let spec = ContainerSpec::new(image, "/")
        .command(vec!["--version".to_string()])
        .timeout(Duration::from_secs(10));
    let output = runner.run(spec).await.ok()?;
    if !output.is_success() {
        return None;
    }
    let text = output.stdout.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ContainerOutput, FakeContainerRunner};
    use crate::fetcher::FakeRepoFetcher;
    use scan_core::{Category, Severity};

    fn config() -> ScanConfig {
        ScanConfig::new("https://example.com/repo.git")
    }

    #[tokio::test]
    async fn completed_run_produces_findings_and_exit_code_metadata() {
        let runner = FakeContainerRunner::new();
        runner.push_output(ContainerOutput {
            exit_code: 1,
            stdout: "1 finding".to_string(),
            stderr: String::new(),
        });
        let fetcher = FakeRepoFetcher;

        let result = run_container_scan(
            &CancellationToken::new(),
            &fetcher,
            &runner,
            &config(),
            "agent-test",
            "tool:latest",
            |_| vec!["scan".to_string()],
            |stdout| {
                Ok(vec![Finding::new(
                    "agent-test",
                    "rule-1",
                    "tool",
                    Severity::High,
                    Category::Other,
                    stdout,
                    "f.rs",
                    1,
                    0.9,
                )])
            },
        )
        .await;

        assert!(result.is_success());
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.tool_metadata.exit_code, Some(1));
    }

    #[tokio::test]
    async fn non_zero_one_exit_is_failed() {
        let runner = FakeContainerRunner::new();
        runner.push_output(ContainerOutput {
            exit_code: 2,
            stdout: String::new(),
            stderr: "boom".to_string(),
        });
        let fetcher = FakeRepoFetcher;

        let result = run_container_scan(
            &CancellationToken::new(),
            &fetcher,
            &runner,
            &config(),
            "agent-test",
            "tool:latest",
            |_| vec!["scan".to_string()],
            |_| Ok(Vec::new()),
        )
        .await;

        assert!(!result.is_success());
        assert!(result.error.unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn parse_error_is_failed() {
        let runner = FakeContainerRunner::new();
        runner.push_output(ContainerOutput {
            exit_code: 0,
            stdout: "not json".to_string(),
            stderr: String::new(),
        });
        let fetcher = FakeRepoFetcher;

        let result = run_container_scan(
            &CancellationToken::new(),
            &fetcher,
            &runner,
            &config(),
            "agent-test",
            "tool:latest",
            |_| vec!["scan".to_string()],
            |_| Err(AgentError::Parse("bad output".to_string())),
        )
        .await;

        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn already_cancelled_context_short_circuits() {
        let runner = FakeContainerRunner::new();
        let fetcher = FakeRepoFetcher;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = run_container_scan(
            &cancel,
            &fetcher,
            &runner,
            &config(),
            "agent-test",
            "tool:latest",
            |_| vec!["scan".to_string()],
            |_| Ok(Vec::new()),
        )
        .await;

        assert!(!result.is_success());
        assert_eq!(result.error.as_deref(), Some("cancelled"));
        assert!(runner.invocations.lock().is_empty());
    }

    #[tokio::test]
    async fn composed_spec_mounts_repo_read_only_and_output_read_write() {
        let runner = FakeContainerRunner::new();
        runner.push_output(ContainerOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        });
        let fetcher = FakeRepoFetcher;

        run_container_scan(
            &CancellationToken::new(),
            &fetcher,
            &runner,
            &config(),
            "agent-test",
            "tool:latest",
            |_| vec!["scan".to_string()],
            |_| Ok(Vec::new()),
        )
        .await;

        let invocations = runner.invocations.lock();
        let spec = invocations.first().unwrap();
        assert_eq!(spec.mounts.len(), 2);
        assert_eq!(spec.mounts[0].container_path, "/repo");
        assert!(!spec.mounts[0].writable);
        assert_eq!(spec.mounts[1].container_path, "/output");
        assert!(spec.mounts[1].writable);
    }

    #[tokio::test]
    async fn probe_tool_version_returns_trimmed_stdout_on_success() {
        let runner = FakeContainerRunner::new();
        runner.push_output(ContainerOutput {
            exit_code: 0,
            stdout: "semgrep 1.45.0\n".to_string(),
            stderr: String::new(),
        });
        let version = probe_tool_version(&runner, "tool:latest").await;
        assert_eq!(version.as_deref(), Some("semgrep 1.45.0"));
    }

    #[tokio::test]
    async fn probe_tool_version_is_none_when_runtime_unavailable() {
        let runner = FakeContainerRunner::new();
        runner.push_error("docker daemon not running");
        let version = probe_tool_version(&runner, "tool:latest").await;
        assert_eq!(version, None);
    }
}
