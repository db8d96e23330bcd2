//! HVE Markdown
//!
//! Parsers for the markdown artifacts shipped in an HVE bundle.
//!
//! ## Features
//!
//! - Frontmatter: known header fields plus the `handoffs` list
//! - Input placeholders: `${input:name}` / `${input:name:default}` with inline
//!   descriptions and bullet-list choices
//!
//! Both parsers are total: malformed input yields empty results, never errors.

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod frontmatter;
pub mod params;

pub use frontmatter::{parse_frontmatter, split_frontmatter};
pub use params::{humanize_label, parse_description_badge, parse_parameters, Badge, DescriptionBadge};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{parse_frontmatter, parse_parameters};
}
