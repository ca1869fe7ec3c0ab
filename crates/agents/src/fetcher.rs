// SPDX-License-Identifier: MIT

//! `RepoFetcher` — shallow repository clone into a fresh scratch directory,
//! shared by every container-based agent so the clone/checkout logic lives
//! in one place (§4.3 "Cross-file dependencies in agents").

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::error::AgentError;

/// A scratch directory holding a freshly fetched repository. The `TempDir`
/// is removed on drop, so the caller must keep this alive for the duration
/// of the scan.
pub struct FetchedRepo {
    _dir: TempDir,
    path: PathBuf,
}

impl FetchedRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
pub trait RepoFetcher: Send + Sync {
    /// Shallow clone `repo_url` at `git_ref` (default branch if `None`),
    /// then optionally check out `commit`.
    async fn fetch(
        &self,
        repo_url: &str,
        git_ref: Option<&str>,
        commit: Option<&str>,
    ) -> Result<FetchedRepo, AgentError>;
}

/// Shells out to the `git` binary for every fetch.
#[derive(Debug, Clone, Default)]
pub struct GitRepoFetcher;

impl GitRepoFetcher {
    pub fn new() -> Self {
        Self
    }

    async fn run_git(args: &[&str], cwd: Option<&Path>) -> Result<(), AgentError> {
        let mut cmd = tokio::process::Command::new("git");
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        let output = cmd.output().await.map_err(|e| AgentError::Fetch(e.to_string()))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(AgentError::Fetch(String::from_utf8_lossy(&output.stderr).trim().to_string()))
        }
    }
}

#[async_trait]
impl RepoFetcher for GitRepoFetcher {
    async fn fetch(
        &self,
        repo_url: &str,
        git_ref: Option<&str>,
        commit: Option<&str>,
    ) -> Result<FetchedRepo, AgentError> {
        let dir = TempDir::new().map_err(AgentError::Io)?;
        let path = dir.path().to_path_buf();

        let mut clone_args = vec!["clone", "--depth", "1"];
        if let Some(r) = git_ref {
            clone_args.extend_from_slice(&["--branch", r]);
        }
        let dest = path.to_string_lossy().into_owned();
        clone_args.extend_from_slice(&[repo_url, &dest]);
        Self::run_git(&clone_args, None).await?;

        if let Some(commit) = commit {
            Self::run_git(&["checkout", commit], Some(&path)).await?;
        }

        Ok(FetchedRepo { _dir: dir, path })
    }
}

/// Creates an empty scratch directory with no network access, for agent
/// unit tests. Callers may populate `path()` with fixture files before
/// running the agent under test.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, Default)]
pub struct FakeRepoFetcher;

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl RepoFetcher for FakeRepoFetcher {
    async fn fetch(
        &self,
        _repo_url: &str,
        _git_ref: Option<&str>,
        _commit: Option<&str>,
    ) -> Result<FetchedRepo, AgentError> {
        let dir = TempDir::new().map_err(AgentError::Io)?;
        let path = dir.path().to_path_buf();
        Ok(FetchedRepo { _dir: dir, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_fetcher_yields_an_existing_empty_directory() {
        let fetcher = FakeRepoFetcher;
        let repo = fetcher.fetch("https://example.com/repo.git", None, None).await.unwrap();
        assert!(repo.path().is_dir());
    }
}
