//! HVE Catalog
//!
//! Manages the artifacts of an HVE bundle inside a project workspace.
//!
//! ## Features
//!
//! - Manifest loading and enable/disable against a [`Workspace`]
//! - Domain classification of artifact names
//! - Prompt-centric grouping with configurable [`ResolutionOverrides`]
//! - Browse tree model and chat query composition
//! - Per-workspace session state (first-run flag, favorites)
//!
//! ## Example
//!
//! ```no_run
//! use hve_catalog::prelude::*;
//!
//! # fn main() -> hve_catalog::Result<()> {
//! let catalog = Catalog::load(Bundle::new("bundle"))?;
//! let workspace = FsWorkspace::new(".");
//! let sections = build_domain_sections(&catalog.items(&workspace));
//! for section in &sections {
//!     println!("{}: {} groups", section.domain, section.groups.len());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod bundle;
pub mod catalog;
pub mod domain;
pub mod error;
pub mod grouping;
pub mod run;
pub mod state;
pub mod view;
pub mod workspace;

pub use bundle::Bundle;
pub use catalog::{
    managed_directories, strip_attribution, update_gitignore, Catalog, DEFAULT_NAMESPACE,
};
pub use domain::{classify_domain, domain_label, Domain};
pub use error::{CatalogError, Result};
pub use grouping::{
    build_domain_sections, find_group, find_section, GroupingEngine, Resolution,
    ResolutionOverrides,
};
pub use run::{chat_prefix, handoff_query, RunRequest};
pub use state::WorkspaceState;
pub use view::{build_tree, TreeCategory, ViewOptions};
pub use workspace::{FsWorkspace, Workspace};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        build_domain_sections, build_tree, classify_domain, Bundle, Catalog, CatalogError,
        FsWorkspace, GroupingEngine, ResolutionOverrides, RunRequest, ViewOptions, Workspace,
        WorkspaceState,
    };
}
