//! Prompt-centric grouping of artifacts
//!
//! Grouping runs in two passes. The first decides which prompt owns each agent
//! and instruction. The second buckets the resulting groups and orphans by
//! domain. Ownership resolution never looks at domains.

use hve_types::{ArtifactGroup, ArtifactItem, ArtifactType, DomainSection};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::domain::domain_label;

/// Suffix stripped from instruction names when looking for a same-named prompt
const INSTRUCTION_SUFFIX: &str = "-instructions";

/// Static name → prompt tables
///
/// Consulted only when the artifact's own relational field does not resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOverrides {
    /// Agent name → owning prompt name
    #[serde(default)]
    pub agents: BTreeMap<String, String>,
    /// Instruction name → owning prompt name
    #[serde(default)]
    pub instructions: BTreeMap<String, String>,
}

impl ResolutionOverrides {
    /// Empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an agent to a prompt
    pub fn with_agent(mut self, agent: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.agents.insert(agent.into(), prompt.into());
        self
    }

    /// Map an instruction to a prompt
    pub fn with_instruction(
        mut self,
        instruction: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        self.instructions.insert(instruction.into(), prompt.into());
        self
    }

    /// Whether both tables are empty
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.instructions.is_empty()
    }

    /// Prompt an agent is pinned to
    ///
    /// Names are matched ASCII case-insensitively: layered config loaders
    /// lowercase table keys.
    pub fn agent_prompt(&self, agent: &str) -> Option<&str> {
        lookup(&self.agents, agent)
    }

    /// Prompt an instruction is pinned to, matched like [`Self::agent_prompt`]
    pub fn instruction_prompt(&self, instruction: &str) -> Option<&str> {
        lookup(&self.instructions, instruction)
    }
}

fn lookup<'a>(table: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    table
        .get(name)
        .or_else(|| {
            table
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, prompt)| prompt)
        })
        .map(String::as_str)
}

/// How a child was attached to its prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Declared by a relational field in the manifest
    Explicit,
    /// Found in the override table
    Override,
    /// Derived from the artifact's name
    NameMatch,
}

/// Resolves prompt ownership and buckets groups by domain
#[derive(Debug, Clone, Default)]
pub struct GroupingEngine {
    overrides: ResolutionOverrides,
}

/// Prompt lookups shared by every resolution in one grouping pass
struct PromptIndex<'a> {
    /// Prompt name → position in the sorted prompt list
    positions: HashMap<&'a str, usize>,
    /// Agent name → prompt whose `agent` field names it
    declared_agents: HashMap<&'a str, &'a str>,
}

impl<'a> PromptIndex<'a> {
    /// `prompts` must be sorted by name
    fn new(prompts: &[&'a ArtifactItem]) -> Self {
        let mut positions = HashMap::new();
        let mut declared_agents = HashMap::new();

        for (i, &prompt) in prompts.iter().enumerate() {
            positions.entry(prompt.name.as_str()).or_insert(i);
            if let Some(agent) = prompt.agent.as_deref() {
                // Sorted input: the lexicographically smallest prompt keeps the claim
                declared_agents
                    .entry(agent)
                    .or_insert(prompt.name.as_str());
            }
        }

        Self {
            positions,
            declared_agents,
        }
    }

    fn position(&self, prompt: &str) -> Option<usize> {
        self.positions.get(prompt).copied()
    }
}

impl GroupingEngine {
    /// Create an engine with the given override tables
    pub fn new(overrides: ResolutionOverrides) -> Self {
        Self { overrides }
    }

    /// The override tables in use
    pub fn overrides(&self) -> &ResolutionOverrides {
        &self.overrides
    }

    /// Partition `items` into domain sections
    ///
    /// Every prompt yields exactly one group. Every agent and instruction ends
    /// up either in exactly one group or in exactly one orphan list.
    pub fn build_domain_sections(&self, items: &[ArtifactItem]) -> Vec<DomainSection> {
        let mut prompts: Vec<&ArtifactItem> = items
            .iter()
            .filter(|item| item.kind == ArtifactType::Prompt)
            .collect();
        prompts.sort_by(|a, b| a.name.cmp(&b.name));

        let index = PromptIndex::new(&prompts);
        let mut groups: Vec<ArtifactGroup> = prompts
            .iter()
            .map(|prompt| ArtifactGroup::new((*prompt).clone()))
            .collect();
        let mut orphans: Vec<ArtifactItem> = Vec::new();

        for item in items {
            let target = match item.kind {
                ArtifactType::Prompt => continue,
                ArtifactType::Agent => self.resolve_agent(&item.name, &index),
                ArtifactType::Instruction => {
                    self.resolve_instruction(&item.name, item.prompt.as_deref(), &index)
                }
            };

            match target {
                Some((position, how)) => {
                    let group = &mut groups[position];
                    debug!(
                        "{} '{}' -> prompt '{}' ({:?})",
                        item.kind, item.name, group.prompt.name, how
                    );
                    if item.kind == ArtifactType::Agent {
                        group.agents.push(item.clone());
                    } else {
                        group.instructions.push(item.clone());
                    }
                }
                None => {
                    debug!("{} '{}' has no parent prompt", item.kind, item.name);
                    orphans.push(item.clone());
                }
            }
        }

        for group in &mut groups {
            group.agents.sort_by(|a, b| a.name.cmp(&b.name));
            group.instructions.sort_by(|a, b| a.name.cmp(&b.name));
        }

        bucket_by_domain(groups, orphans)
    }

    fn resolve_agent(&self, agent: &str, index: &PromptIndex<'_>) -> Option<(usize, Resolution)> {
        let candidates = [
            (index.declared_agents.get(agent).copied(), Resolution::Explicit),
            (self.overrides.agent_prompt(agent), Resolution::Override),
            (Some(agent), Resolution::NameMatch),
        ];
        first_existing(agent, candidates, index)
    }

    fn resolve_instruction(
        &self,
        instruction: &str,
        declared_prompt: Option<&str>,
        index: &PromptIndex<'_>,
    ) -> Option<(usize, Resolution)> {
        let candidates = [
            (declared_prompt, Resolution::Explicit),
            (
                self.overrides.instruction_prompt(instruction),
                Resolution::Override,
            ),
            (
                instruction.strip_suffix(INSTRUCTION_SUFFIX),
                Resolution::NameMatch,
            ),
        ];
        first_existing(instruction, candidates, index)
    }
}

/// First candidate that names an existing prompt
fn first_existing(
    child: &str,
    candidates: [(Option<&str>, Resolution); 3],
    index: &PromptIndex<'_>,
) -> Option<(usize, Resolution)> {
    candidates.into_iter().find_map(|(candidate, how)| {
        let prompt = candidate?;
        let position = index.position(prompt);
        if position.is_none() && how == Resolution::Override {
            warn!(
                "Override maps '{}' to unknown prompt '{}', ignoring",
                child, prompt
            );
        }
        position.map(|p| (p, how))
    })
}

fn bucket_by_domain(groups: Vec<ArtifactGroup>, orphans: Vec<ArtifactItem>) -> Vec<DomainSection> {
    let mut buckets: BTreeMap<String, (Vec<ArtifactGroup>, Vec<ArtifactItem>)> = BTreeMap::new();

    for group in groups {
        let domain = domain_label(group.prompt.category.as_deref(), &group.prompt.name);
        buckets.entry(domain).or_default().0.push(group);
    }

    for orphan in orphans {
        let domain = domain_label(orphan.category.as_deref(), &orphan.name);
        buckets.entry(domain).or_default().1.push(orphan);
    }

    buckets
        .into_iter()
        .map(|(domain, (mut groups, mut orphans))| {
            groups.sort_by(|a, b| a.prompt.name.cmp(&b.prompt.name));
            orphans.sort_by(|a, b| a.name.cmp(&b.name));
            DomainSection {
                domain,
                groups,
                orphans,
            }
        })
        .collect()
}

/// The group owned by `prompt`, searched across all sections
pub fn find_group<'a>(sections: &'a [DomainSection], prompt: &str) -> Option<&'a ArtifactGroup> {
    sections
        .iter()
        .flat_map(|section| section.groups.iter())
        .find(|group| group.prompt.name == prompt)
}

/// The section labelled `domain`, ignoring ASCII case
pub fn find_section<'a>(sections: &'a [DomainSection], domain: &str) -> Option<&'a DomainSection> {
    sections
        .iter()
        .find(|section| section.domain.eq_ignore_ascii_case(domain))
}

/// Group `items` with no override tables
pub fn build_domain_sections(items: &[ArtifactItem]) -> Vec<DomainSection> {
    GroupingEngine::default().build_domain_sections(items)
}
