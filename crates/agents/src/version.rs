// SPDX-License-Identifier: MIT

//! What `Agent::version` reports.

/// The agent wrapper's own version plus the wrapped tool's, as reported by
/// [`crate::Agent::version`]. Any field may be `"unknown"` if its probe fails.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AgentVersion {
    pub agent_version: String,
    pub tool_version: String,
    pub build_date: String,
    pub commit: String,
}

impl AgentVersion {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(agent_version: impl Into<String>) -> Self {
        Self {
            agent_version: agent_version.into(),
            tool_version: Self::UNKNOWN.to_string(),
            build_date: Self::UNKNOWN.to_string(),
            commit: Self::UNKNOWN.to_string(),
        }
    }

    scan_core::setters! {
        into {
            tool_version: String,
            build_date: String,
            commit: String,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_unknown_for_probe_fields() {
        let v = AgentVersion::new("1.0.0");
        assert_eq!(v.tool_version, "unknown");
    }
}
