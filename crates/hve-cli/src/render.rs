//! Plain-text rendering for terminal output.

use hve_catalog::{handoff_query, TreeCategory, WorkspaceState};
use hve_markdown::{humanize_label, parse_description_badge, Badge};
use hve_types::{ArtifactItem, ArtifactType, DomainSection, ParsedDocument, PromptParam};

const ENABLED: &str = "[x]";
const DISABLED: &str = "[ ]";
const FAVORITE: &str = " ★";

fn branch(is_last: bool) -> &'static str {
    if is_last {
        "└── "
    } else {
        "├── "
    }
}

fn continuation(is_last: bool) -> &'static str {
    if is_last {
        "    "
    } else {
        "│   "
    }
}

fn star(item: &ArtifactItem, state: &WorkspaceState) -> &'static str {
    if item.kind == ArtifactType::Prompt && state.is_favorite(&item.name) {
        FAVORITE
    } else {
        ""
    }
}

/// Render the browse tree.
///
/// ```text
/// RPI
/// ├── task-plan ★  Create an implementation plan
/// └── task-research  Research a topic
/// ```
pub fn render_tree(categories: &[TreeCategory], state: &WorkspaceState) -> String {
    let mut output = String::new();
    for category in categories {
        output.push_str(&category.label);
        output.push('\n');
        for (i, item) in category.items.iter().enumerate() {
            output.push_str(branch(i + 1 == category.items.len()));
            output.push_str(&item.name);
            output.push_str(star(item, state));
            if !item.description.is_empty() {
                output.push_str("  ");
                output.push_str(&item.description);
            }
            output.push('\n');
        }
    }
    output
}

fn mark(item: &ArtifactItem) -> &'static str {
    if item.enabled {
        ENABLED
    } else {
        DISABLED
    }
}

fn push_item(
    output: &mut String,
    prefix: &str,
    is_last: bool,
    item: &ArtifactItem,
    state: &WorkspaceState,
) {
    output.push_str(prefix);
    output.push_str(branch(is_last));
    output.push_str(mark(item));
    output.push(' ');
    output.push_str(&item.name);
    if item.kind != ArtifactType::Prompt {
        output.push_str(&format!(" ({})", item.kind));
    }
    output.push_str(star(item, state));
    output.push('\n');
}

/// Render the domain sections overview with enabled marks.
///
/// ```text
/// RPI (2/3 enabled)
/// ├── [x] task-plan ★
/// │   ├── [x] task-planner (agent)
/// │   └── [ ] task-plan-instructions (instruction)
/// └── [ ] rpi-agent (agent)
/// ```
pub fn render_sections(sections: &[DomainSection], state: &WorkspaceState) -> String {
    let mut output = String::new();
    for section in sections {
        let total = section.items().count();
        let enabled = section.items().filter(|i| i.enabled).count();
        output.push_str(&format!("{} ({}/{} enabled)\n", section.domain, enabled, total));

        let entries = section.groups.len() + section.orphans.len();
        for (i, group) in section.groups.iter().enumerate() {
            let is_last = i + 1 == entries;
            push_item(&mut output, "", is_last, &group.prompt, state);

            let children: Vec<&ArtifactItem> =
                group.agents.iter().chain(group.instructions.iter()).collect();
            let prefix = continuation(is_last);
            for (j, child) in children.iter().enumerate() {
                push_item(&mut output, prefix, j + 1 == children.len(), child, state);
            }
        }
        for (i, orphan) in section.orphans.iter().enumerate() {
            let is_last = section.groups.len() + i + 1 == entries;
            push_item(&mut output, "", is_last, orphan, state);
        }
    }
    output
}

/// Render an artifact's detail view.
pub fn render_detail(item: &ArtifactItem, doc: &ParsedDocument) -> String {
    let fm = &doc.frontmatter;
    let mut output = format!("{} ({})\n", item.name, item.kind);
    output.push_str(&format!(
        "Status: {}\n",
        if item.enabled { "enabled" } else { "disabled" }
    ));
    if let Some(maturity) = &fm.maturity {
        output.push_str(&format!("Maturity: {}\n", maturity));
    }

    let description = fm.description.as_deref().unwrap_or(&item.description);
    if !description.is_empty() {
        output.push_str(&format!("Description: {}\n", description));
    }
    if let Some(hint) = &fm.argument_hint {
        output.push_str(&format!("Arguments: {}\n", hint));
    }
    if let Some(apply_to) = &fm.apply_to {
        output.push_str(&format!("Applies to: {}\n", apply_to));
    }
    if let Some(tools) = fm.tools.as_ref().filter(|t| !t.is_empty()) {
        output.push_str(&format!("Tools: {}\n", tools.join(", ")));
    }
    if let Some(handoffs) = fm.handoffs.as_ref().filter(|h| !h.is_empty()) {
        output.push_str("Handoffs:\n");
        for handoff in handoffs {
            match handoff_query(handoff) {
                Some(query) => {
                    output.push_str(&format!("  {} → {}\n", handoff.label, query.trim_end()))
                }
                None => output.push_str(&format!("  {}\n", handoff.label)),
            }
        }
    }

    output.push('\n');
    output.push_str(doc.body.trim_start_matches(['\r', '\n']));
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}

/// Render the parameter list of a runnable artifact.
pub fn render_params(params: &[PromptParam]) -> String {
    if params.is_empty() {
        return "No parameters\n".to_string();
    }

    let mut output = String::new();
    for param in params {
        let badge = parse_description_badge(&param.description);
        let marker = match badge.badge {
            Some(Badge::Required) => " (required)",
            Some(Badge::Optional) => " (optional)",
            None => "",
        };
        output.push_str(&format!("{} [{}]{}\n", humanize_label(&param.name), param.name, marker));
        if !badge.text.is_empty() {
            output.push_str(&format!("    {}\n", badge.text));
        }
        if param.is_boolean {
            output.push_str(&format!("    default: {}\n", param.default_value.to_lowercase()));
        } else if !param.default_value.is_empty() {
            output.push_str(&format!("    default: {}\n", param.default_value));
        }
        for choice in &param.choices {
            if choice.label.is_empty() {
                output.push_str(&format!("    * {}\n", choice.value));
            } else {
                output.push_str(&format!("    * {} - {}\n", choice.value, choice.label));
            }
        }
    }
    output
}
