// SPDX-License-Identifier: MIT

//! Per-rule severity/category/confidence/reference mappings as static data
//! (§4.3 "Rule tables") — adding a new rule is a data change to one of the
//! `&'static [RuleMapping]` tables below, not a code change.

use scan_core::{Category, Finding, Severity};

use crate::parse::RawIssue;

/// Static metadata for one rule ID in a tool's own namespace.
#[derive(Debug, Clone, Copy)]
pub struct RuleMapping {
    pub rule_id: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub confidence: f64,
    pub references: &'static [&'static str],
}

/// Fallback used when a rule ID has no entry in its table: surfaces the
/// finding rather than silently dropping it, but flags it as low-confidence
/// and uncategorized so reviewers know the mapping is missing.
pub const UNKNOWN_RULE: RuleMapping = RuleMapping {
    rule_id: "unknown",
    category: Category::Other,
    severity: Severity::Low,
    confidence: 0.4,
    references: &[],
};

/// Look up `rule_id` in `table`, falling back to [`UNKNOWN_RULE`] if absent.
pub fn lookup(table: &[RuleMapping], rule_id: &str) -> RuleMapping {
    match table.iter().find(|m| m.rule_id == rule_id) {
        Some(m) => *m,
        None => UNKNOWN_RULE,
    }
}

/// Rule table for the SAST pattern-matching engine.
pub const SAST_PATTERN_RULES: &[RuleMapping] = &[
    RuleMapping {
        rule_id: "sast-sql-concat",
        category: Category::SqlInjection,
        severity: Severity::High,
        confidence: 0.75,
        references: &["https://owasp.org/www-community/attacks/SQL_Injection"],
    },
    RuleMapping {
        rule_id: "sast-shell-exec",
        category: Category::CommandInjection,
        severity: Severity::High,
        confidence: 0.7,
        references: &["https://owasp.org/www-community/attacks/Command_Injection"],
    },
    RuleMapping {
        rule_id: "sast-path-join-unsanitized",
        category: Category::PathTraversal,
        severity: Severity::Medium,
        confidence: 0.6,
        references: &["https://owasp.org/www-community/attacks/Path_Traversal"],
    },
    RuleMapping {
        rule_id: "sast-weak-hash",
        category: Category::InsecureCrypto,
        severity: Severity::Medium,
        confidence: 0.8,
        references: &["https://owasp.org/www-community/vulnerabilities/Insecure_Cryptographic_Storage"],
    },
    RuleMapping {
        rule_id: "sast-unsafe-deserialize",
        category: Category::InsecureDeserialization,
        severity: Severity::High,
        confidence: 0.65,
        references: &["https://owasp.org/www-community/vulnerabilities/Deserialization_of_untrusted_data"],
    },
];

/// Rule table for the JavaScript/TypeScript linter agent.
pub const JS_LINT_RULES: &[RuleMapping] = &[
    RuleMapping {
        rule_id: "no-eval",
        category: Category::CommandInjection,
        severity: Severity::High,
        confidence: 0.85,
        references: &["https://eslint.org/docs/latest/rules/no-eval"],
    },
    RuleMapping {
        rule_id: "no-inner-html",
        category: Category::Xss,
        severity: Severity::Medium,
        confidence: 0.6,
        references: &["https://owasp.org/www-community/attacks/xss/"],
    },
    RuleMapping {
        rule_id: "detect-unsafe-regex",
        category: Category::Misconfiguration,
        severity: Severity::Low,
        confidence: 0.5,
        references: &[],
    },
    RuleMapping {
        rule_id: "no-csrf-exempt",
        category: Category::Csrf,
        severity: Severity::Medium,
        confidence: 0.55,
        references: &["https://owasp.org/www-community/attacks/csrf"],
    },
];

/// Rule table for the dependency/SCA audit agent. Rule IDs here are
/// advisory-ID prefixes rather than exact matches handled by [`lookup`];
/// callers that need prefix matching use [`lookup_by_prefix`].
pub const SCA_AUDIT_RULES: &[RuleMapping] = &[
    RuleMapping {
        rule_id: "GHSA",
        category: Category::DependencyVuln,
        severity: Severity::High,
        confidence: 0.9,
        references: &["https://github.com/advisories"],
    },
    RuleMapping {
        rule_id: "RUSTSEC",
        category: Category::DependencyVuln,
        severity: Severity::High,
        confidence: 0.9,
        references: &["https://rustsec.org/advisories/"],
    },
    RuleMapping {
        rule_id: "outdated",
        category: Category::OutdatedDeps,
        severity: Severity::Low,
        confidence: 0.95,
        references: &[],
    },
    RuleMapping {
        rule_id: "unmaintained",
        category: Category::SupplyChain,
        severity: Severity::Medium,
        confidence: 0.7,
        references: &[],
    },
    RuleMapping {
        rule_id: "license",
        category: Category::LicenseIssue,
        severity: Severity::Low,
        confidence: 0.8,
        references: &[],
    },
];

/// Match `rule_id` against [`SCA_AUDIT_RULES`] by prefix (advisory IDs carry
/// a numeric suffix the static table can't enumerate).
pub fn lookup_by_prefix(table: &[RuleMapping], rule_id: &str) -> RuleMapping {
    match table.iter().find(|m| rule_id.starts_with(m.rule_id)) {
        Some(m) => *m,
        None => UNKNOWN_RULE,
    }
}

/// Rule table for the secrets-detection agent.
pub const SECRETS_RULES: &[RuleMapping] = &[
    RuleMapping {
        rule_id: "aws-access-key",
        category: Category::HardcodedSecrets,
        severity: Severity::High,
        confidence: 0.9,
        references: &["https://docs.aws.amazon.com/IAM/latest/UserGuide/id_credentials_access-keys.html"],
    },
    RuleMapping {
        rule_id: "private-key-block",
        category: Category::HardcodedSecrets,
        severity: Severity::High,
        confidence: 0.95,
        references: &[],
    },
    RuleMapping {
        rule_id: "generic-api-key",
        category: Category::HardcodedSecrets,
        severity: Severity::Medium,
        confidence: 0.5,
        references: &[],
    },
    RuleMapping {
        rule_id: "high-entropy-string",
        category: Category::HardcodedSecrets,
        severity: Severity::Low,
        confidence: 0.3,
        references: &[],
    },
];

/// Rule table for the DAST prober agent.
pub const DAST_RULES: &[RuleMapping] = &[
    RuleMapping {
        rule_id: "missing-security-headers",
        category: Category::Misconfiguration,
        severity: Severity::Low,
        confidence: 0.8,
        references: &["https://owasp.org/www-project-secure-headers/"],
    },
    RuleMapping {
        rule_id: "reflected-input",
        category: Category::Xss,
        severity: Severity::High,
        confidence: 0.6,
        references: &["https://owasp.org/www-community/attacks/xss/"],
    },
    RuleMapping {
        rule_id: "auth-bypass-probe",
        category: Category::AuthBypass,
        severity: Severity::High,
        confidence: 0.55,
        references: &[],
    },
];

/// Map one parsed tool issue onto a normalized [`Finding`], using `mapping`
/// (already resolved by [`lookup`] or [`lookup_by_prefix`]) for the parts
/// the tool's own output doesn't carry.
pub fn issue_to_finding(agent_id: &str, tool_name: &str, mapping: RuleMapping, issue: &RawIssue) -> Finding {
    let title = if issue.rule_id.is_empty() { "finding".to_string() } else { issue.rule_id.clone() };
    let mut finding = Finding::new(
        agent_id,
        &issue.rule_id,
        tool_name,
        mapping.severity,
        mapping.category,
        title,
        &issue.file,
        issue.line,
        mapping.confidence,
    );
    if !issue.message.is_empty() {
        finding = finding.description(issue.message.clone());
    }
    if let Some(col) = issue.column {
        finding = finding.column(col);
    }
    if let Some(snippet) = &issue.snippet {
        finding = finding.code_snippet(snippet.clone());
    }
    if !mapping.references.is_empty() {
        finding = finding.references(mapping.references.iter().map(|s| s.to_string()).collect());
    }
    finding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_rule_resolves_exactly() {
        let m = lookup(SAST_PATTERN_RULES, "sast-sql-concat");
        assert_eq!(m.category, Category::SqlInjection);
        assert_eq!(m.severity, Severity::High);
    }

    #[test]
    fn unknown_rule_falls_back_without_panicking() {
        let m = lookup(SAST_PATTERN_RULES, "does-not-exist");
        assert_eq!(m.category, Category::Other);
        assert_eq!(m.rule_id, "unknown");
    }

    #[test]
    fn sca_advisory_ids_match_by_prefix() {
        let m = lookup_by_prefix(SCA_AUDIT_RULES, "GHSA-xxxx-yyyy-zzzz");
        assert_eq!(m.category, Category::DependencyVuln);
    }

    #[test]
    fn unmatched_prefix_falls_back() {
        let m = lookup_by_prefix(SCA_AUDIT_RULES, "totally-unrecognized-advisory");
        assert_eq!(m.category, Category::Other);
    }

    #[test]
    fn issue_to_finding_carries_message_into_description() {
        let issue = RawIssue {
            rule_id: "sast-sql-concat".to_string(),
            file: "app.py".to_string(),
            line: 42,
            column: Some(5),
            message: "string-concatenated query".to_string(),
            snippet: None,
        };
        let mapping = lookup(SAST_PATTERN_RULES, &issue.rule_id);
        let finding = issue_to_finding("agent-sast", "pattern-engine", mapping, &issue);
        assert_eq!(finding.description, "string-concatenated query");
        assert_eq!(finding.column, Some(5));
        assert_eq!(finding.severity, Severity::High);
    }
}
