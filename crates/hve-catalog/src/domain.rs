//! Functional domain inference from artifact names
//!
//! This is a lossy fallback: an explicit `category` on the artifact always wins.

use std::fmt;

/// Functional domain an artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Domain {
    /// `ado-*`
    AzureDevOps,
    /// `task-*`, `rpi*`
    Rpi,
    /// `git-*`
    Git,
    /// `github-*`
    GitHub,
    /// `prompt-*`
    PromptEngineering,
    /// `doc-*`
    Documentation,
    /// `gen-*`, `test-*`
    DataScience,
    /// `*-builder`, `*-creation`
    DocumentBuilders,
    /// `instruction-*`
    InstructionGeneration,
    /// `security-*`
    Security,
    /// Anything else
    General,
}

impl Domain {
    /// Display label used for section headings
    pub fn label(&self) -> &'static str {
        match self {
            Domain::AzureDevOps => "Azure DevOps",
            Domain::Rpi => "RPI",
            Domain::Git => "Git",
            Domain::GitHub => "GitHub",
            Domain::PromptEngineering => "Prompt Engineering",
            Domain::Documentation => "Documentation",
            Domain::DataScience => "Data Science",
            Domain::DocumentBuilders => "Document Builders",
            Domain::InstructionGeneration => "Instruction Generation",
            Domain::Security => "Security",
            Domain::General => "General",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy)]
enum NameMatch {
    Prefix(&'static str),
    Suffix(&'static str),
}

impl NameMatch {
    fn matches(&self, name: &str) -> bool {
        match self {
            NameMatch::Prefix(p) => name.starts_with(*p),
            NameMatch::Suffix(s) => name.ends_with(*s),
        }
    }
}

/// Ordered classification rules, first match wins
const DOMAIN_RULES: &[(&[NameMatch], Domain)] = &[
    (&[NameMatch::Prefix("ado-")], Domain::AzureDevOps),
    (&[NameMatch::Prefix("task-"), NameMatch::Prefix("rpi")], Domain::Rpi),
    (&[NameMatch::Prefix("git-")], Domain::Git),
    (&[NameMatch::Prefix("github-")], Domain::GitHub),
    (&[NameMatch::Prefix("prompt-")], Domain::PromptEngineering),
    (&[NameMatch::Prefix("doc-")], Domain::Documentation),
    (&[NameMatch::Prefix("gen-"), NameMatch::Prefix("test-")], Domain::DataScience),
    (
        &[NameMatch::Suffix("-builder"), NameMatch::Suffix("-creation")],
        Domain::DocumentBuilders,
    ),
    (&[NameMatch::Prefix("instruction-")], Domain::InstructionGeneration),
    (&[NameMatch::Prefix("security-")], Domain::Security),
];

/// Map an artifact name to its functional domain
pub fn classify_domain(name: &str) -> Domain {
    DOMAIN_RULES
        .iter()
        .find(|(matchers, _)| matchers.iter().any(|m| m.matches(name)))
        .map_or(Domain::General, |(_, domain)| *domain)
}

/// Domain label for an artifact, preferring its explicit category
pub fn domain_label(category: Option<&str>, name: &str) -> String {
    match category {
        Some(category) => category.to_string(),
        None => classify_domain(name).label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_rules() {
        assert_eq!(classify_domain("ado-create-pull-request"), Domain::AzureDevOps);
        assert_eq!(classify_domain("task-researcher"), Domain::Rpi);
        assert_eq!(classify_domain("rpi-agent"), Domain::Rpi);
        assert_eq!(classify_domain("git-commit"), Domain::Git);
        assert_eq!(classify_domain("github-backlog-manager"), Domain::GitHub);
        assert_eq!(classify_domain("prompt-builder"), Domain::PromptEngineering);
        assert_eq!(classify_domain("doc-ops"), Domain::Documentation);
        assert_eq!(classify_domain("gen-data-spec"), Domain::DataScience);
        assert_eq!(classify_domain("test-streamlit-dashboard"), Domain::DataScience);
        assert_eq!(classify_domain("instruction-analyzer"), Domain::InstructionGeneration);
        assert_eq!(classify_domain("security-plan-creator"), Domain::Security);
    }

    #[test]
    fn test_suffix_rules() {
        assert_eq!(classify_domain("prd-builder"), Domain::DocumentBuilders);
        assert_eq!(classify_domain("adr-creation"), Domain::DocumentBuilders);
    }

    #[test]
    fn test_rule_order() {
        // prefix rules listed earlier win over the suffix rule
        assert_eq!(classify_domain("prompt-builder").label(), "Prompt Engineering");
        assert_eq!(classify_domain("git-builder").label(), "Git");
        // github- is not swallowed by git-
        assert_eq!(classify_domain("github-builder").label(), "GitHub");
    }

    #[test]
    fn test_fallback_to_general() {
        assert_eq!(classify_domain("memory"), Domain::General);
        assert_eq!(classify_domain(""), Domain::General);
        assert_eq!(classify_domain("").label(), "General");
    }

    #[test]
    fn test_domain_label_prefers_category() {
        assert_eq!(domain_label(Some("Workflows"), "ado-thing"), "Workflows");
        assert_eq!(domain_label(None, "ado-thing"), "Azure DevOps");
    }
}
