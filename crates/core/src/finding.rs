// SPDX-License-Identifier: MIT

//! The normalized [`Finding`] format every agent emits, independent of the
//! scanner tool that produced it.

use sha2::{Digest, Sha256};

/// Severity of a finding, ordered from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

crate::simple_display! {
    Severity {
        Info => "info",
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

/// Fixed vulnerability/issue classification. New rules map onto one of
/// these; the set itself is not meant to grow per-rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SqlInjection,
    Xss,
    CommandInjection,
    PathTraversal,
    InsecureCrypto,
    HardcodedSecrets,
    InsecureDeserialization,
    AuthBypass,
    Csrf,
    Misconfiguration,
    DependencyVuln,
    OutdatedDeps,
    SupplyChain,
    LicenseIssue,
    Other,
}

crate::simple_display! {
    Category {
        SqlInjection => "sql_injection",
        Xss => "xss",
        CommandInjection => "command_injection",
        PathTraversal => "path_traversal",
        InsecureCrypto => "insecure_crypto",
        HardcodedSecrets => "hardcoded_secrets",
        InsecureDeserialization => "insecure_deserialization",
        AuthBypass => "auth_bypass",
        Csrf => "csrf",
        Misconfiguration => "misconfiguration",
        DependencyVuln => "dependency_vuln",
        OutdatedDeps => "outdated_deps",
        SupplyChain => "supply_chain",
        LicenseIssue => "license_issue",
        Other => "other",
    }
}

/// A suggested remediation attached to a finding by the agent that produced it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FixSuggestion {
    pub description: String,
    pub code: Option<String>,
}

impl FixSuggestion {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), code: None }
    }

    crate::setters! {
        option {
            code: String,
        }
    }
}

/// A single normalized security observation produced by an agent.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Finding {
    /// Stable across re-derivation from the same (agent_id, rule_id, file, line).
    pub id: String,
    pub agent_id: String,
    /// Rule identifier in the originating tool's own namespace.
    pub rule_id: String,
    pub tool_name: String,
    pub severity: Severity,
    pub category: Category,
    pub title: String,
    pub description: String,
    /// Repo-relative path.
    pub file: String,
    pub line: u32,
    pub column: Option<u32>,
    /// Redacted if the underlying match looks like a live secret.
    pub code_snippet: Option<String>,
    pub confidence: f64,
    pub references: Vec<String>,
    pub fix_suggestion: Option<FixSuggestion>,
}

impl Finding {
    /// Derive the stable Finding ID: truncated SHA-256 of
    /// `agent_id\0rule_id\0file\0line`, hex-encoded to 16 characters.
    pub fn derive_id(agent_id: &str, rule_id: &str, file: &str, line: u32) -> String {
        let mut hasher = Sha256::new();
        hasher.update(agent_id.as_bytes());
        hasher.update(b"\0");
        hasher.update(rule_id.as_bytes());
        hasher.update(b"\0");
        hasher.update(file.as_bytes());
        hasher.update(b"\0");
        hasher.update(line.to_le_bytes());
        let digest = hasher.finalize();
        hex::encode(digest)[..16].to_string()
    }

    /// Builder-style constructor for the common case. `confidence` is
    /// clamped to `[0.0, 1.0]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        agent_id: impl Into<String>,
        rule_id: impl Into<String>,
        tool_name: impl Into<String>,
        severity: Severity,
        category: Category,
        title: impl Into<String>,
        file: impl Into<String>,
        line: u32,
        confidence: f64,
    ) -> Self {
        let agent_id = agent_id.into();
        let rule_id = rule_id.into();
        let file = file.into();
        let id = Self::derive_id(&agent_id, &rule_id, &file, line);
        Self {
            id,
            agent_id,
            rule_id,
            tool_name: tool_name.into(),
            severity,
            category,
            title: title.into(),
            description: String::new(),
            file,
            line,
            column: None,
            code_snippet: None,
            confidence: confidence.clamp(0.0, 1.0),
            references: Vec::new(),
            fix_suggestion: None,
        }
    }

    crate::setters! {
        into {
            description: String,
        }
        option {
            column: u32,
            code_snippet: String,
            fix_suggestion: FixSuggestion,
        }
        set {
            references: Vec<String>,
        }
    }
}
