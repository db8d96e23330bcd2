//! Browse tree model

use hve_types::{ArtifactItem, ArtifactType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::domain_label;

/// How the browse tree is filtered and grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Group by artifact type instead of by domain
    #[serde(default)]
    pub group_by_type: bool,
    /// Show only one artifact type; `None` shows all of them
    #[serde(default = "default_type_filter")]
    pub type_filter: Option<ArtifactType>,
}

fn default_type_filter() -> Option<ArtifactType> {
    Some(ArtifactType::Prompt)
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            group_by_type: false,
            type_filter: default_type_filter(),
        }
    }
}

/// A top-level node of the browse tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeCategory {
    /// Heading shown for the node
    pub label: String,
    /// Items under the heading, sorted by name
    pub items: Vec<ArtifactItem>,
}

/// Build the browse tree from catalog items
///
/// Disabled items are hidden. Empty categories are never produced.
pub fn build_tree(items: &[ArtifactItem], options: &ViewOptions) -> Vec<TreeCategory> {
    let visible = items
        .iter()
        .filter(|item| item.enabled)
        .filter(|item| options.type_filter.map_or(true, |kind| item.kind == kind));

    let mut categories = if options.group_by_type {
        let mut by_type: BTreeMap<ArtifactType, Vec<ArtifactItem>> = BTreeMap::new();
        for item in visible {
            by_type.entry(item.kind).or_default().push(item.clone());
        }
        by_type
            .into_iter()
            .map(|(kind, items)| TreeCategory {
                label: kind.plural_label().to_string(),
                items,
            })
            .collect::<Vec<_>>()
    } else {
        let mut by_domain: BTreeMap<String, Vec<ArtifactItem>> = BTreeMap::new();
        for item in visible {
            by_domain
                .entry(domain_label(item.category.as_deref(), &item.name))
                .or_default()
                .push(item.clone());
        }
        by_domain
            .into_iter()
            .map(|(label, items)| TreeCategory { label, items })
            .collect()
    };

    for category in &mut categories {
        category.items.sort_by(|a, b| a.name.cmp(&b.name));
    }
    categories
}
