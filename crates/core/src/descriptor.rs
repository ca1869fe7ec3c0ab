// SPDX-License-Identifier: MIT

//! What an Agent publishes about itself, independent of any particular scan.

use std::time::Duration;

/// Memory/CPU ceilings applied to a single agent invocation's container.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourceCaps {
    pub memory_mb: u32,
    pub cpu_cores: f64,
}

impl ResourceCaps {
    pub fn new(memory_mb: u32, cpu_cores: f64) -> Self {
        Self { memory_mb, cpu_cores }
    }
}

impl Default for ResourceCaps {
    fn default() -> Self {
        Self { memory_mb: 512, cpu_cores: 1.0 }
    }
}

/// Static metadata an [`crate::agent`]-like implementation publishes about
/// itself: what it can scan and what it costs to run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AgentDescriptor {
    pub name: String,
    pub version: String,
    /// Languages this agent can scan; `"*"` means language-agnostic.
    pub supported_languages: Vec<String>,
    pub supported_categories: Vec<crate::finding::Category>,
    pub requires_container: bool,
    #[serde(with = "crate::duration::nanos")]
    pub default_timeout: Duration,
    pub resource_caps: ResourceCaps,
}

impl AgentDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            supported_languages: Vec::new(),
            supported_categories: Vec::new(),
            requires_container: true,
            default_timeout: Duration::from_secs(300),
            resource_caps: ResourceCaps::default(),
        }
    }

    /// Whether this agent claims support for `language`, including the
    /// language-agnostic wildcard.
    pub fn supports_language(&self, language: &str) -> bool {
        self.supported_languages.iter().any(|l| l == "*" || l.eq_ignore_ascii_case(language))
    }

    crate::setters! {
        set {
            supported_languages: Vec<String>,
            supported_categories: Vec<crate::finding::Category>,
            requires_container: bool,
            default_timeout: Duration,
            resource_caps: ResourceCaps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_supports_any_language() {
        let desc = AgentDescriptor::new("pattern-engine", "1.0.0")
            .supported_languages(vec!["*".to_string()]);
        assert!(desc.supports_language("go"));
        assert!(desc.supports_language("rust"));
    }

    #[test]
    fn specific_language_list_is_case_insensitive() {
        let desc = AgentDescriptor::new("js-linter", "1.0.0")
            .supported_languages(vec!["javascript".to_string(), "typescript".to_string()]);
        assert!(desc.supports_language("JavaScript"));
        assert!(!desc.supports_language("go"));
    }

    #[test]
    fn default_timeout_serializes_as_integer_nanoseconds() {
        let desc = AgentDescriptor::new("pattern-engine", "1.0.0");
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["default_timeout"], serde_json::json!(300_000_000_000u64));
    }
}
