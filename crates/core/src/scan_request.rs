// SPDX-License-Identifier: MIT

//! The payload of a scan [`crate::Job`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::descriptor::ResourceCaps;
use crate::finding::Severity;

/// Deserialized scan job payload: what to scan, how, and with which agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub repo_url: String,
    /// Branch or commit-ish; `None` means the repository's default branch.
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    pub commit: Option<String>,
    /// Narrow scan to matching languages; empty means auto-select by
    /// detected repository language.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Incremental hint: restrict to these file globs.
    #[serde(default)]
    pub files: Vec<String>,
    /// Explicit agent names to run; empty means auto-select by language.
    #[serde(default)]
    pub agents: Vec<String>,
    #[serde(default, with = "crate::duration::nanos_opt")]
    pub timeout: Option<Duration>,
    pub severity_threshold: Option<Severity>,
    #[serde(default)]
    pub resource_caps: std::collections::HashMap<String, ResourceCaps>,
}

impl ScanRequest {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            git_ref: None,
            commit: None,
            languages: Vec::new(),
            files: Vec::new(),
            agents: Vec::new(),
            timeout: None,
            severity_threshold: None,
            resource_caps: std::collections::HashMap::new(),
        }
    }

    /// Whether the caller pinned an explicit agent set, versus asking for
    /// auto-selection by language.
    pub fn has_explicit_agents(&self) -> bool {
        !self.agents.is_empty()
    }

    crate::setters! {
        into {
            git_ref: String,
            commit: String,
        }
        set {
            languages: Vec<String>,
            files: Vec<String>,
            agents: Vec<String>,
            timeout: Option<Duration>,
            severity_threshold: Option<Severity>,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_agents_means_auto_select() {
        let req = ScanRequest::new("https://example.com/repo.git");
        assert!(!req.has_explicit_agents());
    }

    #[test]
    fn round_trips_through_json() {
        let req = ScanRequest::new("https://example.com/repo.git")
            .git_ref("main")
            .languages(vec!["go".to_string()])
            .timeout(Some(std::time::Duration::from_secs(120)));
        let json = serde_json::to_string(&req).unwrap();
        let back: ScanRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }

    #[test]
    fn payload_schema_matches_spec_field_names() {
        let json = serde_json::json!({
            "repo_url": "https://example.com/repo.git",
            "ref": "main",
            "languages": ["go"],
            "agents": [],
            "timeout": 60_000_000_000u64,
        });
        let req: ScanRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.git_ref.as_deref(), Some("main"));
        assert_eq!(req.timeout, Some(std::time::Duration::from_secs(60)));
    }

    #[test]
    fn timeout_serializes_as_integer_nanoseconds_not_seconds() {
        let req = ScanRequest::new("https://example.com/repo.git")
            .timeout(Some(std::time::Duration::from_secs(1)));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["timeout"], serde_json::json!(1_000_000_000u64));
    }
}
