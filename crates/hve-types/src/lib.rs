//! HVE Types - Core types for the HVE artifact catalog
//!
//! This module defines the data model shared by the parsers, the catalog and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a bundled artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    Agent,
    Prompt,
    Instruction,
}

impl ArtifactType {
    /// All artifact types in display order
    pub const ALL: [ArtifactType; 3] = [
        ArtifactType::Agent,
        ArtifactType::Prompt,
        ArtifactType::Instruction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Agent => "agent",
            ArtifactType::Prompt => "prompt",
            ArtifactType::Instruction => "instruction",
        }
    }

    /// Directory under `.github/` that holds artifacts of this type
    pub fn subdirectory(&self) -> &'static str {
        match self {
            ArtifactType::Agent => "agents",
            ArtifactType::Prompt => "prompts",
            ArtifactType::Instruction => "instructions",
        }
    }

    /// Plural heading used when grouping by type
    pub fn plural_label(&self) -> &'static str {
        match self {
            ArtifactType::Agent => "Agents",
            ArtifactType::Prompt => "Prompts",
            ArtifactType::Instruction => "Instructions",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "agent" | "agents" => Ok(ArtifactType::Agent),
            "prompt" | "prompts" => Ok(ArtifactType::Prompt),
            "instruction" | "instructions" => Ok(ArtifactType::Instruction),
            other => Err(format!("unknown artifact type '{}'", other)),
        }
    }
}

/// A single artifact entry in the bundled manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ArtifactType,
    /// Path relative to the bundle's `bundled/` directory (e.g. `agents/task-planner.agent.md`)
    pub relative_path: String,
    #[serde(default)]
    pub description: String,
    /// Functional domain declared by the artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Agent name from prompt frontmatter, links a prompt to its agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Prompt name from instruction frontmatter, links an instruction to its parent prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl ManifestEntry {
    /// File name component of the relative path
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// On-disk shape of `bundled-manifest.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundledManifest {
    #[serde(default)]
    pub artifacts: Vec<ManifestEntry>,
}

/// An artifact entry together with its current enabled state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ArtifactType,
    /// Relative path within the bundled directory
    pub path: String,
    pub description: String,
    /// Whether the artifact is currently present in the workspace
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl ArtifactItem {
    pub fn new(name: impl Into<String>, kind: ArtifactType) -> Self {
        let name = name.into();
        Self {
            path: format!("{}/{}.{}.md", kind.subdirectory(), name, kind.as_str()),
            name,
            kind,
            description: String::new(),
            enabled: true,
            category: None,
            agent: None,
            prompt: None,
        }
    }

    pub fn from_entry(entry: &ManifestEntry, enabled: bool) -> Self {
        Self {
            name: entry.name.clone(),
            kind: entry.kind,
            path: entry.relative_path.clone(),
            description: entry.description.clone(),
            enabled,
            category: entry.category.clone(),
            agent: entry.agent.clone(),
            prompt: entry.prompt.clone(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Agents and prompts can be run in chat, instructions cannot
    pub fn is_runnable(&self) -> bool {
        self.kind != ArtifactType::Instruction
    }
}

// ============================================================================
// Parsed Document Types
// ============================================================================

/// Frontmatter fields parsed on demand from artifact markdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    pub description: Option<String>,
    pub maturity: Option<String>,
    pub category: Option<String>,
    pub handoffs: Option<Vec<HandoffEntry>>,
    pub argument_hint: Option<String>,
    pub tools: Option<Vec<String>>,
    pub agent: Option<String>,
    pub apply_to: Option<String>,
}

impl Frontmatter {
    pub fn is_empty(&self) -> bool {
        *self == Frontmatter::default()
    }
}

/// A cross-reference suggestion declared in agent frontmatter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandoffEntry {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

/// Result of splitting a markdown document into header and body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub frontmatter: Frontmatter,
    pub body: String,
}

/// A selectable choice for a multiple-choice parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptChoice {
    pub value: String,
    pub label: String,
}

/// Input parameter extracted from `${input:...}` placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptParam {
    pub name: String,
    pub default_value: String,
    pub description: String,
    pub choices: Vec<PromptChoice>,
    pub is_boolean: bool,
}

// ============================================================================
// Grouping Types
// ============================================================================

/// A prompt together with the agents and instructions that belong to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactGroup {
    pub prompt: ArtifactItem,
    pub agents: Vec<ArtifactItem>,
    pub instructions: Vec<ArtifactItem>,
}

impl ArtifactGroup {
    pub fn new(prompt: ArtifactItem) -> Self {
        Self {
            prompt,
            agents: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// The prompt followed by its children
    pub fn items(&self) -> impl Iterator<Item = &ArtifactItem> {
        std::iter::once(&self.prompt)
            .chain(self.agents.iter())
            .chain(self.instructions.iter())
    }
}

/// All groups and orphans that share a domain label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainSection {
    pub domain: String,
    pub groups: Vec<ArtifactGroup>,
    pub orphans: Vec<ArtifactItem>,
}

impl DomainSection {
    /// Every item in the section, used for counting
    pub fn items(&self) -> impl Iterator<Item = &ArtifactItem> {
        self.groups
            .iter()
            .flat_map(ArtifactGroup::items)
            .chain(self.orphans.iter())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_deserialization() {
        let json = r#"{
            "artifacts": [
                {
                    "name": "task-planner",
                    "type": "agent",
                    "relativePath": "agents/task-planner.agent.md",
                    "description": "Plans tasks",
                    "category": "RPI"
                },
                {
                    "name": "git-commit",
                    "type": "prompt",
                    "relativePath": "prompts/git-commit.prompt.md",
                    "description": "Commit changes",
                    "agent": "git-helper"
                }
            ]
        }"#;

        let manifest: BundledManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.artifacts.len(), 2);
        assert_eq!(manifest.artifacts[0].kind, ArtifactType::Agent);
        assert_eq!(manifest.artifacts[0].category.as_deref(), Some("RPI"));
        assert_eq!(manifest.artifacts[1].agent.as_deref(), Some("git-helper"));
        assert_eq!(manifest.artifacts[1].file_name(), "git-commit.prompt.md");
    }

    #[test]
    fn test_artifact_type_from_str() {
        assert_eq!("Prompt".parse::<ArtifactType>(), Ok(ArtifactType::Prompt));
        assert_eq!(
            "instructions".parse::<ArtifactType>(),
            Ok(ArtifactType::Instruction)
        );
        assert!("skill".parse::<ArtifactType>().is_err());
    }

    #[test]
    fn test_section_items_counts_everything() {
        let mut group = ArtifactGroup::new(ArtifactItem::new("task-plan", ArtifactType::Prompt));
        group
            .agents
            .push(ArtifactItem::new("task-planner", ArtifactType::Agent));
        let section = DomainSection {
            domain: "RPI".to_string(),
            groups: vec![group],
            orphans: vec![ArtifactItem::new("rpi-agent", ArtifactType::Agent)],
        };
        assert_eq!(section.items().count(), 3);
    }
}
