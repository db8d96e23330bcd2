//! Workspace filesystem collaborator
//!
//! The catalog never touches the project directly; it goes through this trait
//! with paths relative to the workspace root.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CatalogError, Result};

/// Minimal filesystem surface the catalog needs from its host
pub trait Workspace {
    /// Whether a workspace-relative path exists
    fn exists(&self, path: &Path) -> bool;

    /// Read a file's bytes
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write a file, creating parent directories as needed
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Delete a file; deleting a missing file is not an error
    fn remove(&self, path: &Path) -> Result<()>;
}

/// `std::fs` workspace rooted at a project directory
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    /// Create a workspace rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl Workspace for FsWorkspace {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let full = self.resolve(path);
        fs::read(&full).map_err(|e| CatalogError::io(full, e))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
        }
        fs::write(&full, contents).map_err(|e| CatalogError::io(full, e))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let full = self.resolve(path);
        match fs::remove_file(&full) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CatalogError::io(full, e)),
        }
    }
}
