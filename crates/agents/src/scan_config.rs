// SPDX-License-Identifier: MIT

//! Per-agent resolved inputs to [`crate::Agent::scan`], derived by the
//! coordinator from a [`scan_core::ScanRequest`].

use std::time::Duration;

use scan_core::ResourceCaps;

/// What to scan, how, and under which caps. One `ScanConfig` is built by the
/// coordinator per selected agent (not shared mutable state between them).
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub repo_url: String,
    pub git_ref: Option<String>,
    pub commit: Option<String>,
    /// Empty means the agent is not language-restricted by the request.
    pub languages: Vec<String>,
    pub files: Vec<String>,
    pub resource_caps: ResourceCaps,
    /// Wall-clock budget for this agent's entire `scan()` call.
    pub timeout: Duration,
}

impl ScanConfig {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            git_ref: None,
            commit: None,
            languages: Vec::new(),
            files: Vec::new(),
            resource_caps: ResourceCaps::default(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Whether `language` is in scope, given an empty set means "no restriction".
    pub fn wants_language(&self, language: &str) -> bool {
        self.languages.is_empty()
            || self.languages.iter().any(|l| l.eq_ignore_ascii_case(language))
    }

    scan_core::setters! {
        into {
            git_ref: String,
            commit: String,
        }
        set {
            languages: Vec<String>,
            files: Vec<String>,
            resource_caps: ResourceCaps,
            timeout: Duration,
        }
    }
}
