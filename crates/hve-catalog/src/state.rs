//! Per-workspace session state
//!
//! Holds what the host used to keep in editor settings. Callers load it,
//! pass it explicitly to the operations that need it, and save it back.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::error::Result;
use crate::workspace::Workspace;

const STATE_FILE: &str = ".state.json";

/// Session state persisted inside the workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceState {
    /// Whether first-run initialization has already enabled the bundle
    #[serde(default)]
    pub initialized: bool,
    /// Favorite prompt names in the order they were added
    #[serde(default)]
    pub favorites: Vec<String>,
}

impl WorkspaceState {
    /// Workspace-relative location of the state file for `namespace`
    pub fn path(namespace: &str) -> PathBuf {
        PathBuf::from(".github").join(namespace).join(STATE_FILE)
    }

    /// Load state, falling back to defaults when missing or unreadable
    pub fn load(workspace: &dyn Workspace, namespace: &str) -> Result<Self> {
        let path = Self::path(namespace);
        if !workspace.exists(&path) {
            return Ok(Self::default());
        }

        let bytes = workspace.read(&path)?;
        match serde_json::from_slice(&bytes) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!("Ignoring corrupt state file {:?}: {}", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Persist state to the workspace
    pub fn save(&self, workspace: &dyn Workspace, namespace: &str) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        workspace.write(&Self::path(namespace), &bytes)
    }

    /// Whether `name` is a favorite
    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorites.iter().any(|f| f == name)
    }

    /// Add or remove `name`, returning whether it is now a favorite
    pub fn toggle_favorite(&mut self, name: &str) -> bool {
        if let Some(pos) = self.favorites.iter().position(|f| f == name) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(name.to_string());
            true
        }
    }
}
