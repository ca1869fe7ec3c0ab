// SPDX-License-Identifier: MIT

//! `ContainerRunner` — the capability trait that isolates container
//! invocation from agent logic, so a unit test can script exit codes without
//! a container runtime on the test machine.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use scan_core::ResourceCaps;

use crate::error::AgentError;

/// A bind mount into the container: `host_path` is made visible at
/// `container_path`, read-only unless `writable`.
#[derive(Debug, Clone)]
pub struct Mount {
    pub host_path: PathBuf,
    pub container_path: String,
    pub writable: bool,
}

impl Mount {
    pub fn read_only(host_path: impl Into<PathBuf>, container_path: impl Into<String>) -> Self {
        Self { host_path: host_path.into(), container_path: container_path.into(), writable: false }
    }

    pub fn read_write(host_path: impl Into<PathBuf>, container_path: impl Into<String>) -> Self {
        Self { host_path: host_path.into(), container_path: container_path.into(), writable: true }
    }
}

/// One container invocation, fully specified ahead of execution.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub image: String,
    pub mounts: Vec<Mount>,
    pub working_dir: String,
    pub command: Vec<String>,
    pub resource_caps: ResourceCaps,
    pub timeout: Duration,
}

impl ContainerSpec {
    pub fn new(image: impl Into<String>, working_dir: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            mounts: Vec::new(),
            working_dir: working_dir.into(),
            command: Vec::new(),
            resource_caps: ResourceCaps::default(),
            timeout: Duration::from_secs(300),
        }
    }

    scan_core::setters! {
        set {
            mounts: Vec<Mount>,
            command: Vec<String>,
            resource_caps: ResourceCaps,
            timeout: Duration,
        }
    }
}

/// The result of running a [`ContainerSpec`] to completion (or failure to
/// even start, which surfaces as `Err` rather than a nonzero exit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ContainerOutput {
    /// Per §4.3 step 5: many scanners use exit code 1 to mean "findings
    /// present", so 0 and 1 both count as a successful run.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0 || self.exit_code == 1
    }
}

/// Capability for running one scan tool invocation inside a container.
/// Isolated behind a trait so agents don't shell out to `docker` directly —
/// the "Cross-file dependencies in agents" concern is addressed by owning
/// this once, not by each agent reimplementing process plumbing.
#[async_trait]
pub trait ContainerRunner: Send + Sync {
    async fn run(&self, spec: ContainerSpec) -> Result<ContainerOutput, AgentError>;
}

/// Shells out to the `docker` binary for every invocation.
#[derive(Debug, Clone, Default)]
pub struct DockerContainerRunner;

impl DockerContainerRunner {
    pub fn new() -> Self {
        Self
    }

    fn build_args(spec: &ContainerSpec) -> Vec<String> {
        let mut args = vec!["run".to_string(), "--rm".to_string()];

        args.push("--memory".to_string());
        args.push(format!("{}m", spec.resource_caps.memory_mb));
        args.push("--cpus".to_string());
        args.push(format!("{}", spec.resource_caps.cpu_cores));

        for mount in &spec.mounts {
            args.push("-v".to_string());
            let mode = if mount.writable { "rw" } else { "ro" };
            args.push(format!(
                "{}:{}:{mode}",
                mount.host_path.display(),
                mount.container_path
            ));
        }

        args.push("-w".to_string());
        args.push(spec.working_dir.clone());
        args.push(spec.image.clone());
        args.extend(spec.command.iter().cloned());
        args
    }
}

#[async_trait]
impl ContainerRunner for DockerContainerRunner {
    async fn run(&self, spec: ContainerSpec) -> Result<ContainerOutput, AgentError> {
        let args = Self::build_args(&spec);
        let timeout = spec.timeout;

        let exec = async move {
            tokio::process::Command::new("docker")
                .args(&args)
                .output()
                .await
                .map_err(|e| AgentError::RuntimeUnavailable(e.to_string()))
        };

        match tokio::time::timeout(timeout, exec).await {
            Ok(Ok(output)) => Ok(ContainerOutput {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(err)) => Err(err),
            Err(_elapsed) => Err(AgentError::Timeout),
        }
    }
}

/// Scripted [`ContainerRunner`] for agent unit tests: returns the next
/// canned [`ContainerOutput`] off a queue instead of touching a real
/// container runtime.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct FakeContainerRunner {
    responses: parking_lot::Mutex<std::collections::VecDeque<Result<ContainerOutput, String>>>,
    pub invocations: parking_lot::Mutex<Vec<ContainerSpec>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeContainerRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response to be returned by the next `run` call.
    pub fn push_output(&self, output: ContainerOutput) {
        self.responses.lock().push_back(Ok(output));
    }

    /// Queue a runtime-unavailable failure for the next `run` call.
    pub fn push_error(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl ContainerRunner for FakeContainerRunner {
    async fn run(&self, spec: ContainerSpec) -> Result<ContainerOutput, AgentError> {
        self.invocations.lock().push(spec);
        match self.responses.lock().pop_front() {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(AgentError::RuntimeUnavailable(message)),
            None => Err(AgentError::RuntimeUnavailable("no scripted response queued".to_string())),
        }
    }
}
