//! Frontmatter parsing
//!
//! Artifacts carry a YAML-like header delimited by `---` lines. Only a fixed set
//! of keys is read, line by line, so a malformed header degrades to missing
//! fields instead of failing the whole document.

use hve_types::{Frontmatter, HandoffEntry, ParsedDocument};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

const DELIMITER: &str = "---";

/// Top-level `key: value` line (keys start at column 0)
#[allow(clippy::expect_used)]
static KEY_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w[\w-]*):\s*(.+)$").expect("key/value pattern is valid"));

/// `key: value` line inside a handoff entry
#[allow(clippy::expect_used)]
static ENTRY_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\w+):\s*(.+)$").expect("entry field pattern is valid"));

/// Start of a YAML sequence item
#[allow(clippy::expect_used)]
static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-(?:\s+(.*))?$").expect("list item pattern is valid"));

/// Split a markdown document into frontmatter and body
///
/// Without a well-formed header the frontmatter is empty and the body is the
/// entire input.
pub fn parse_frontmatter(text: &str) -> ParsedDocument {
    match split_frontmatter(text) {
        Some((header, body)) => ParsedDocument {
            frontmatter: parse_header(header),
            body: body.to_string(),
        },
        None => ParsedDocument {
            frontmatter: Frontmatter::default(),
            body: text.to_string(),
        },
    }
}

/// Locate the header block, returning `(header, body)`
///
/// The header is the text between the opening and closing `---` lines. The
/// body is everything after the closing line's terminator.
pub fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let content = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = content.split_inclusive('\n');

    let first = lines.next()?;
    if !first.ends_with('\n') || first.trim_end() != DELIMITER {
        return None;
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let header = &content[header_start..offset];
            let body = &content[offset + line.len()..];
            return Some((header, body));
        }
        offset += line.len();
    }

    None
}

fn parse_header(header: &str) -> Frontmatter {
    let lines: Vec<&str> = header.lines().collect();
    let mut frontmatter = Frontmatter::default();

    for line in &lines {
        let Some(caps) = KEY_VALUE_RE.captures(line) else {
            continue;
        };
        let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let cleaned = strip_quotes(value.as_str()).to_string();

        match key.as_str() {
            "description" => frontmatter.description = Some(cleaned),
            "maturity" => frontmatter.maturity = Some(cleaned),
            "category" => frontmatter.category = Some(cleaned),
            "agent" => frontmatter.agent = Some(cleaned),
            "applyTo" => frontmatter.apply_to = Some(cleaned),
            "argument-hint" => frontmatter.argument_hint = Some(cleaned),
            "tools" => frontmatter.tools = Some(parse_inline_list(value.as_str())),
            _ => {}
        }
    }

    if let Some(block) = block_lines(&lines, "tools") {
        let tools: Vec<String> = block
            .iter()
            .filter_map(|line| LIST_ITEM_RE.captures(line))
            .filter_map(|caps| caps.get(1).map(|m| strip_quotes(m.as_str()).to_string()))
            .filter(|tool| !tool.is_empty())
            .collect();
        frontmatter.tools = Some(tools);
    }

    if let Some(block) = block_lines(&lines, "handoffs") {
        frontmatter.handoffs = Some(parse_handoffs(&block));
    }

    frontmatter
}

/// Lines belonging to a `key:` whose value is a nested block
///
/// The block runs until the next line that starts at column 0 and is not a
/// sequence item.
fn block_lines<'a>(lines: &[&'a str], key: &str) -> Option<Vec<&'a str>> {
    let start = lines.iter().position(|line| {
        line.strip_prefix(key)
            .and_then(|rest| rest.strip_prefix(':'))
            .is_some_and(|rest| rest.trim().is_empty())
    })?;

    let block = lines[start + 1..]
        .iter()
        .take_while(|line| {
            line.trim().is_empty() || line.starts_with(char::is_whitespace) || line.starts_with('-')
        })
        .copied()
        .collect();

    Some(block)
}

fn parse_handoffs(block: &[&str]) -> Vec<HandoffEntry> {
    let mut entries = Vec::new();
    let mut current: Option<HandoffEntry> = None;

    for line in block {
        let field = match LIST_ITEM_RE.captures(line) {
            Some(caps) => {
                entries.extend(current.take());
                current = Some(HandoffEntry::default());
                caps.get(1).map_or("", |m| m.as_str())
            }
            None => *line,
        };

        let Some(entry) = current.as_mut() else {
            continue;
        };
        let Some(caps) = ENTRY_FIELD_RE.captures(field) else {
            continue;
        };
        let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let cleaned = strip_quotes(value.as_str()).to_string();

        match key.as_str() {
            "label" => entry.label = cleaned,
            "agent" => entry.agent = Some(cleaned),
            "prompt" => entry.prompt = Some(cleaned),
            "keyword" => entry.keyword = Some(cleaned),
            "send" => entry.send = parse_bool(&cleaned),
            _ => {}
        }
    }
    entries.extend(current);

    entries.retain(|entry| !entry.label.is_empty());
    entries
}

/// `['a', "b"]` or a single scalar
fn parse_inline_list(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.starts_with('[') {
        match serde_yaml::from_str::<Vec<String>>(value) {
            Ok(items) => return items,
            Err(e) => debug!("Falling back to comma split for list {:?}: {}", value, e),
        }
        return value
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .map(|item| strip_quotes(item).to_string())
            .filter(|item| !item.is_empty())
            .collect();
    }
    vec![strip_quotes(value).to_string()]
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Remove one leading and one trailing quote character
fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    let value = value.strip_prefix(['\'', '"']).unwrap_or(value);
    value.strip_suffix(['\'', '"']).unwrap_or(value)
}
