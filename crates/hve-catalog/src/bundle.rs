//! Bundled artifact source
//!
//! A bundle is a directory holding `bundled-manifest.json` and the markdown
//! files it lists under `bundled/`.

use hve_types::BundledManifest;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CatalogError, Result};

/// Manifest file name at the bundle root
pub const MANIFEST_FILE: &str = "bundled-manifest.json";
/// Directory holding the artifact files
pub const BUNDLED_DIR: &str = "bundled";

/// Read-only access to a bundle directory
#[derive(Debug, Clone)]
pub struct Bundle {
    root: PathBuf,
}

impl Bundle {
    /// Open a bundle rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Bundle root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Read and parse the manifest
    pub fn manifest(&self) -> Result<BundledManifest> {
        let path = self.manifest_path();
        let content = fs::read_to_string(&path).map_err(|e| CatalogError::io(&path, e))?;
        serde_json::from_str(&content).map_err(|source| CatalogError::Manifest { path, source })
    }

    /// Absolute path of an artifact given its manifest-relative path
    pub fn artifact_path(&self, relative_path: &str) -> PathBuf {
        let cleaned = relative_path.strip_prefix("./").unwrap_or(relative_path);
        self.root.join(BUNDLED_DIR).join(cleaned)
    }

    /// Raw bytes of a bundled artifact
    pub fn read_bytes(&self, relative_path: &str) -> Result<Vec<u8>> {
        let path = self.artifact_path(relative_path);
        debug!("Reading bundled artifact {:?}", path);
        fs::read(&path).map_err(|e| CatalogError::io(path, e))
    }

    /// UTF-8 text of a bundled artifact
    pub fn read_document(&self, relative_path: &str) -> Result<String> {
        let path = self.artifact_path(relative_path);
        fs::read_to_string(&path).map_err(|e| CatalogError::io(path, e))
    }
}
