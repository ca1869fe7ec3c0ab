// SPDX-License-Identifier: MIT

//! Scanner agent wrappers: the [`Agent`] capability contract (§4.3), the
//! `ContainerRunner`/`RepoFetcher` capabilities every container-based agent
//! is built on, table-driven rule mappings, and the five concrete agents
//! shipped by default (SAST pattern engine, JS/TS linter, dependency audit,
//! secrets scanner, DAST prober).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod container;
pub mod dast;
pub mod error;
pub mod fetcher;
pub mod js_lint;
pub mod parse;
pub mod recipe;
pub mod rules;
pub mod sast_pattern;
pub mod sca_audit;
pub mod scan_config;
pub mod secrets;
pub mod traits;
pub mod version;

pub use container::{ContainerOutput, ContainerRunner, ContainerSpec, DockerContainerRunner, Mount};
pub use dast::DastProberAgent;
pub use error::AgentError;
pub use fetcher::{FetchedRepo, GitRepoFetcher, RepoFetcher};
pub use js_lint::JsLintAgent;
pub use sast_pattern::PatternEngineAgent;
pub use sca_audit::DependencyAuditAgent;
pub use scan_config::ScanConfig;
pub use secrets::SecretScannerAgent;
pub use traits::Agent;
pub use version::AgentVersion;

#[cfg(any(test, feature = "test-support"))]
pub use container::FakeContainerRunner;
#[cfg(any(test, feature = "test-support"))]
pub use fetcher::FakeRepoFetcher;

use std::sync::Arc;

/// Build the five agents shipped by default, each wired to the same
/// `fetcher`/`runner` capability implementations (cheap to clone — both are
/// stateless handles to external processes).
pub fn default_agents(
    fetcher: GitRepoFetcher,
    runner: DockerContainerRunner,
) -> Vec<Arc<dyn Agent>> {
    vec![
        Arc::new(PatternEngineAgent::new(fetcher.clone(), runner.clone())),
        Arc::new(JsLintAgent::new(fetcher.clone(), runner.clone())),
        Arc::new(DependencyAuditAgent::new(fetcher.clone(), runner.clone())),
        Arc::new(SecretScannerAgent::new(fetcher.clone(), runner.clone())),
        Arc::new(DastProberAgent::new(fetcher, runner)),
    ]
}
