// SPDX-License-Identifier: MIT

//! Shared JSON parsing for the tool output format emitted by every
//! container-based agent's wrapped tool. Each tool is assumed to report
//! `{"files_scanned": N, "issues": [{"rule_id", "file", "line", ...}]}` on
//! stdout — a SARIF-like normalization performed by the container image's
//! entrypoint, not by this crate.

use serde::Deserialize;

use crate::error::AgentError;

#[derive(Debug, Clone, Deserialize)]
pub struct RawIssue {
    pub rule_id: String,
    pub file: String,
    pub line: u32,
    #[serde(default)]
    pub column: Option<u32>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawToolOutput {
    #[serde(default)]
    pub issues: Vec<RawIssue>,
    #[serde(default)]
    pub files_scanned: u64,
    #[serde(default)]
    pub lines_scanned: u64,
}

pub fn parse_tool_json(stdout: &str) -> Result<RawToolOutput, AgentError> {
    serde_json::from_str(stdout).map_err(|e| AgentError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_output() {
        let json = r#"{"files_scanned": 3, "issues": [{"rule_id": "r1", "file": "a.rs", "line": 1}]}"#;
        let out = parse_tool_json(json).unwrap();
        assert_eq!(out.files_scanned, 3);
        assert_eq!(out.issues.len(), 1);
    }

    #[test]
    fn malformed_output_is_a_parse_error() {
        let err = parse_tool_json("not json at all").unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{"issues": []}"#;
        let out = parse_tool_json(json).unwrap();
        assert_eq!(out.files_scanned, 0);
    }
}
