//! Input placeholder extraction
//!
//! Prompts declare their inputs inline as `${input:name}` or
//! `${input:name:default}`. Text after the placeholder describes it, and an
//! indented bullet list right below it enumerates the allowed values.

use hve_types::{PromptChoice, PromptParam};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static INPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{input:([^}:]+)(?::([^}]*))?\}").expect("input placeholder pattern is valid")
});

#[allow(clippy::expect_used)]
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[:–—-]\s*").expect("separator pattern is valid"));

#[allow(clippy::expect_used)]
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+\*\s+").expect("bullet pattern is valid"));

#[allow(clippy::expect_used)]
static REQUIRED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(Required\)\s*").expect("required badge pattern is valid"));

#[allow(clippy::expect_used)]
static OPTIONAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\(Optional[^)]*\)\s*").expect("optional badge pattern is valid")
});

/// Extract input parameters in order of first appearance
///
/// Names are deduplicated: only the first placeholder for a name contributes
/// its default, description and choices.
pub fn parse_parameters(text: &str) -> Vec<PromptParam> {
    let mut seen = HashSet::new();
    let mut params: Vec<PromptParam> = Vec::new();
    let lines: Vec<&str> = text.lines().collect();

    for (i, &line) in lines.iter().enumerate() {
        let mut introduced = None;

        for caps in INPUT_RE.captures_iter(line) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !seen.insert(name.as_str()) {
                continue;
            }

            let default_value = caps.get(2).map_or("", |m| m.as_str()).to_string();
            params.push(PromptParam {
                name: name.as_str().to_string(),
                is_boolean: is_boolean_literal(&default_value),
                default_value,
                description: inline_description(&line[whole.end()..]),
                choices: Vec::new(),
            });
            introduced = Some(params.len() - 1);
        }

        // Choices belong to the last parameter introduced on this line
        if let Some(idx) = introduced {
            params[idx].choices = collect_choices(&lines[i + 1..]);
        }
    }

    params
}

fn inline_description(rest: &str) -> String {
    let rest = rest.trim_start_matches([':', '`']).trim_start();
    SEPARATOR_RE.replace(rest, "").trim().to_string()
}

fn collect_choices(lines: &[&str]) -> Vec<PromptChoice> {
    lines
        .iter()
        .take_while(|line| BULLET_RE.is_match(line))
        .map(|line| {
            let bullet = BULLET_RE.replace(line, "");
            let bullet = bullet.trim();
            match bullet.split_once(" - ") {
                Some((value, label)) => PromptChoice {
                    value: value.replace('`', "").trim().to_string(),
                    label: label.trim().to_string(),
                },
                None => PromptChoice {
                    value: bullet.replace('`', "").trim().to_string(),
                    label: String::new(),
                },
            }
        })
        .collect()
}

fn is_boolean_literal(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

/// Requirement marker found at the start of a parameter description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    /// `(Required)`
    Required,
    /// `(Optional)` or `(Optional, ...)`
    Optional,
}

/// A parameter description split into its badge and remaining text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionBadge {
    /// Leading requirement marker, if any
    pub badge: Option<Badge>,
    /// Description with the marker removed
    pub text: String,
}

/// Split a leading `(Required)` / `(Optional...)` marker off a description
pub fn parse_description_badge(description: &str) -> DescriptionBadge {
    if let Some(m) = REQUIRED_RE.find(description) {
        return DescriptionBadge {
            badge: Some(Badge::Required),
            text: description[m.end()..].trim().to_string(),
        };
    }
    if let Some(m) = OPTIONAL_RE.find(description) {
        return DescriptionBadge {
            badge: Some(Badge::Optional),
            text: description[m.end()..].trim().to_string(),
        };
    }
    DescriptionBadge {
        badge: None,
        text: description.to_string(),
    }
}

/// Convert camelCase or kebab-case to Title Case: `validateOnly` → `Validate Only`
pub fn humanize_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;

    for c in name.chars() {
        if c == '-' || c == '_' {
            if !label.ends_with(' ') {
                label.push(' ');
            }
            prev = Some(' ');
            continue;
        }

        let at_word_start = match prev {
            None => true,
            Some(p) if p.is_lowercase() && c.is_uppercase() => {
                label.push(' ');
                true
            }
            Some(p) => !p.is_alphanumeric(),
        };

        if at_word_start {
            label.extend(c.to_uppercase());
        } else {
            label.push(c);
        }
        prev = Some(c);
    }

    label
}
