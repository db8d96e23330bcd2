//! Error types for catalog operations

use hve_types::ArtifactType;
use std::path::PathBuf;
use thiserror::Error;

/// Catalog errors
///
/// Parsing and grouping never fail; these cover the I/O boundary and
/// user-supplied lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading or writing a file failed
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// File that was being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The bundled manifest is not valid JSON of the expected shape
    #[error("Invalid manifest {}: {source}", .path.display())]
    Manifest {
        /// Manifest file
        path: PathBuf,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// Session state could not be encoded
    #[error("State error: {0}")]
    State(#[from] serde_json::Error),

    /// No manifest entry matches the lookup
    #[error("Artifact '{name}' not found{}", .kind.map(|k| format!(" (type {})", k)).unwrap_or_default())]
    NotFound {
        /// Requested name
        name: String,
        /// Requested type, if the lookup was narrowed
        kind: Option<ArtifactType>,
    },

    /// The artifact exists but cannot be sent to chat
    #[error("Artifact '{name}' cannot be run: {reason}")]
    NotRunnable {
        /// Artifact name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// A supplied parameter value is invalid or a required one is missing
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// What is wrong with it
        reason: String,
    },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, CatalogError>;
