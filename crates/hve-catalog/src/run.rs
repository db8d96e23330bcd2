//! Chat query composition
//!
//! A prompt is invoked as `/name`, an agent as `@name`, followed by the values
//! of its parameters: free text first, then selected choices, then booleans.

use hve_markdown::{parse_description_badge, Badge};
use hve_types::{ArtifactItem, ArtifactType, HandoffEntry, PromptParam};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{CatalogError, Result};

/// Query prefix that addresses an artifact in chat, including the trailing space
pub fn chat_prefix(item: &ArtifactItem) -> String {
    match item.kind {
        ArtifactType::Agent => format!("@{} ", item.name),
        _ => format!("/{} ", item.name),
    }
}

/// Query that follows a handoff, preferring its agent over its prompt
pub fn handoff_query(handoff: &HandoffEntry) -> Option<String> {
    if let Some(agent) = handoff.agent.as_deref().filter(|a| !a.is_empty()) {
        return Some(format!("@{} ", agent));
    }
    handoff
        .prompt
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|prompt| format!("/{} ", prompt))
}

/// Parameter values collected for one run of an artifact
#[derive(Debug, Clone)]
pub struct RunRequest<'a> {
    item: &'a ArtifactItem,
    params: Vec<PromptParam>,
    values: HashMap<String, String>,
}

impl<'a> RunRequest<'a> {
    /// Start a run of `item` with the parameters extracted from its body
    ///
    /// Instructions and disabled artifacts are rejected.
    pub fn new(item: &'a ArtifactItem, params: Vec<PromptParam>) -> Result<Self> {
        if !item.is_runnable() {
            return Err(CatalogError::NotRunnable {
                name: item.name.clone(),
                reason: "instructions are applied automatically and cannot be run".to_string(),
            });
        }
        if !item.enabled {
            return Err(CatalogError::NotRunnable {
                name: item.name.clone(),
                reason: "artifact is not enabled in this workspace".to_string(),
            });
        }

        Ok(Self {
            item,
            params,
            values: HashMap::new(),
        })
    }

    /// Declared parameters in order of appearance
    pub fn params(&self) -> &[PromptParam] {
        &self.params
    }

    /// Supply a value for a parameter
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        let param = self
            .params
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| invalid(name, "no such parameter"))?;

        if !param.choices.is_empty() {
            if !is_choice(param, value.trim()) {
                let allowed: Vec<&str> = param.choices.iter().map(|c| c.value.as_str()).collect();
                return Err(invalid(
                    name,
                    &format!("'{}' is not one of: {}", value, allowed.join(", ")),
                ));
            }
        } else if param.is_boolean {
            parse_bool(&value).ok_or_else(|| invalid(name, "expected true or false"))?;
        }

        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Builder form of [`RunRequest::set`]
    pub fn with_value(mut self, name: &str, value: impl Into<String>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Assemble the chat query
    ///
    /// Missing values fall back to parameter defaults. A choice default only
    /// counts when it names one of the choices.
    pub fn compose(&self) -> Result<String> {
        let prefix = chat_prefix(self.item);
        if self.params.is_empty() {
            return Ok(prefix);
        }

        let mut text = Vec::new();
        let mut selected = Vec::new();
        let mut flags = Vec::new();

        for param in &self.params {
            let supplied = self.values.get(&param.name).map(String::as_str);

            if is_flag(param) {
                let value = supplied
                    .and_then(parse_bool)
                    .or_else(|| parse_bool(&param.default_value))
                    .unwrap_or(false);
                flags.push(value.to_string());
                continue;
            }

            let value = if param.choices.is_empty() {
                supplied.unwrap_or(param.default_value.as_str()).trim()
            } else {
                supplied
                    .map(str::trim)
                    .or_else(|| {
                        let default = param.default_value.trim();
                        is_choice(param, default).then_some(default)
                    })
                    .unwrap_or("")
            };

            if value.is_empty() {
                if is_required(param) {
                    return Err(invalid(&param.name, "a value is required"));
                }
                continue;
            }

            if param.choices.is_empty() {
                text.push(value);
            } else {
                selected.push(value);
            }
        }

        let mut query = prefix;
        for segment in text.iter().chain(selected.iter()) {
            query.push_str(segment);
            query.push(' ');
        }
        for flag in &flags {
            query.push_str(flag);
            query.push(' ');
        }

        let query = query.trim().to_string();
        debug!("Composed query for {}: {:?}", self.item.name, query);
        Ok(query)
    }
}

/// Booleans without declared choices render as a checkbox
fn is_flag(param: &PromptParam) -> bool {
    param.is_boolean && param.choices.is_empty()
}

fn is_choice(param: &PromptParam, value: &str) -> bool {
    param.choices.iter().any(|c| c.value == value)
}

fn is_required(param: &PromptParam) -> bool {
    parse_description_badge(&param.description).badge == Some(Badge::Required)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn invalid(name: &str, reason: &str) -> CatalogError {
    CatalogError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
