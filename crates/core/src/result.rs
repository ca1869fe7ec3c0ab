// SPDX-License-Identifier: MIT

//! The result a single agent produces for a single [`crate::ScanRequest`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::finding::Finding;

/// Lifecycle status of a single agent's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRunStatus {
    Running,
    Completed,
    Failed,
}

crate::simple_display! {
    AgentRunStatus {
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Diagnostic detail about the underlying tool invocation, independent of
/// the findings it produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub tool_version: Option<String>,
    pub files_scanned: u64,
    pub lines_scanned: u64,
    pub exit_code: Option<i32>,
}

/// What one agent returned for one scan request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_id: String,
    pub status: AgentRunStatus,
    #[serde(with = "crate::duration::nanos")]
    pub duration: Duration,
    pub findings: Vec<Finding>,
    pub tool_metadata: ToolMetadata,
    pub error: Option<String>,
    /// Populated only on a coordinator's consolidated result: one entry per
    /// fanned-out agent, for auditability (§4.4 step 6). Empty on a leaf
    /// agent's own `AgentResult`.
    #[serde(default)]
    pub sub_results: Vec<AgentResult>,
}

impl AgentResult {
    pub fn completed(agent_id: impl Into<String>, duration: Duration, findings: Vec<Finding>) -> Self {
        Self {
            agent_id: agent_id.into(),
            status: AgentRunStatus::Completed,
            duration,
            findings,
            tool_metadata: ToolMetadata::default(),
            error: None,
            sub_results: Vec::new(),
        }
    }

    pub fn failed(agent_id: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            status: AgentRunStatus::Failed,
            duration,
            findings: Vec::new(),
            tool_metadata: ToolMetadata::default(),
            error: Some(error.into()),
            sub_results: Vec::new(),
        }
    }

    crate::setters! {
        set {
            tool_metadata: ToolMetadata,
            sub_results: Vec<AgentResult>,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AgentRunStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_result_has_no_error() {
        let result = AgentResult::completed("agent-sast", Duration::from_secs(1), Vec::new());
        assert!(result.is_success());
        assert!(result.error.is_none());
    }

    #[test]
    fn failed_result_carries_error_and_no_findings() {
        let result = AgentResult::failed("agent-sast", Duration::from_secs(1), "container OOM");
        assert!(!result.is_success());
        assert_eq!(result.error.as_deref(), Some("container OOM"));
        assert!(result.findings.is_empty());
    }

    #[test]
    fn duration_serializes_as_a_single_integer_nanos_value() {
        let result = AgentResult::completed("agent-sast", Duration::from_millis(250), Vec::new());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["duration"], serde_json::json!(250_000_000u64));
    }
}
