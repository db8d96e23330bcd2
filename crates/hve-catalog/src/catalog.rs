//! Artifact catalog
//!
//! Joins the bundled manifest with a workspace to answer which artifacts are
//! enabled, and copies or deletes artifact files to change that.

use hve_markdown::parse_frontmatter;
use hve_types::{ArtifactItem, ArtifactType, BundledManifest, ManifestEntry, ParsedDocument};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::bundle::Bundle;
use crate::error::{CatalogError, Result};
use crate::state::WorkspaceState;
use crate::workspace::Workspace;

/// Namespace directory used when none is configured
pub const DEFAULT_NAMESPACE: &str = "hve-core";

const GITIGNORE: &str = ".gitignore";
const GITIGNORE_HEADER: &str = "# HVE Core managed artifacts";

#[allow(clippy::expect_used)]
static ATTRIBUTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*-\s*Brought to you by.*$").expect("attribution pattern is valid")
});

/// Manifest entries bound to the bundle they came from
#[derive(Debug, Clone)]
pub struct Catalog {
    bundle: Bundle,
    manifest: BundledManifest,
    namespace: String,
}

impl Catalog {
    /// Load the manifest from `bundle`
    pub fn load(bundle: Bundle) -> Result<Self> {
        let manifest = bundle.manifest()?;
        info!(
            "Loaded {} artifacts from {:?}",
            manifest.artifacts.len(),
            bundle.root()
        );
        Ok(Self::from_manifest(bundle, manifest))
    }

    /// Build a catalog from an already parsed manifest
    pub fn from_manifest(bundle: Bundle, manifest: BundledManifest) -> Self {
        Self {
            bundle,
            manifest,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Use a different namespace directory under `.github/<type>/`
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Namespace directory name
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Bundle the catalog reads from
    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    /// Manifest entries in manifest order
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.manifest.artifacts
    }

    /// Look up an entry by name, narrowed to `kind` when given
    ///
    /// Without a type the first entry in manifest order wins.
    pub fn find_entry(&self, name: &str, kind: Option<ArtifactType>) -> Result<&ManifestEntry> {
        self.manifest
            .artifacts
            .iter()
            .find(|e| e.name == name && kind.map_or(true, |k| e.kind == k))
            .ok_or_else(|| CatalogError::NotFound {
                name: name.to_string(),
                kind,
            })
    }

    /// Workspace-relative path the entry is copied to when enabled
    pub fn target_path(&self, entry: &ManifestEntry) -> PathBuf {
        PathBuf::from(".github")
            .join(entry.kind.subdirectory())
            .join(&self.namespace)
            .join(entry.file_name())
    }

    /// Every artifact with its current enabled state
    pub fn items(&self, workspace: &dyn Workspace) -> Vec<ArtifactItem> {
        self.manifest
            .artifacts
            .iter()
            .map(|entry| self.to_item(entry, workspace))
            .collect()
    }

    /// A single artifact with its current enabled state
    pub fn item(
        &self,
        name: &str,
        kind: Option<ArtifactType>,
        workspace: &dyn Workspace,
    ) -> Result<ArtifactItem> {
        let entry = self.find_entry(name, kind)?;
        Ok(self.to_item(entry, workspace))
    }

    fn to_item(&self, entry: &ManifestEntry, workspace: &dyn Workspace) -> ArtifactItem {
        let enabled = workspace.exists(&self.target_path(entry));
        let mut item = ArtifactItem::from_entry(entry, enabled);
        item.description = strip_attribution(&item.description);
        item
    }

    /// Copy an artifact into the workspace
    pub fn enable(
        &self,
        name: &str,
        kind: Option<ArtifactType>,
        workspace: &dyn Workspace,
    ) -> Result<()> {
        let entry = self.find_entry(name, kind)?;
        self.copy_entry(entry, workspace)
    }

    /// Remove an artifact from the workspace
    pub fn disable(
        &self,
        name: &str,
        kind: Option<ArtifactType>,
        workspace: &dyn Workspace,
    ) -> Result<()> {
        let entry = self.find_entry(name, kind)?;
        self.remove_entry(entry, workspace)
    }

    /// Enable every artifact, returning how many were written
    pub fn enable_all(&self, workspace: &dyn Workspace) -> Result<usize> {
        self.apply(None, workspace, Self::copy_entry)
    }

    /// Disable every artifact, returning how many were considered
    pub fn disable_all(&self, workspace: &dyn Workspace) -> Result<usize> {
        self.apply(None, workspace, Self::remove_entry)
    }

    /// Enable every artifact of one type
    pub fn enable_by_type(&self, kind: ArtifactType, workspace: &dyn Workspace) -> Result<usize> {
        self.apply(Some(kind), workspace, Self::copy_entry)
    }

    /// Disable every artifact of one type
    pub fn disable_by_type(&self, kind: ArtifactType, workspace: &dyn Workspace) -> Result<usize> {
        self.apply(Some(kind), workspace, Self::remove_entry)
    }

    /// Enable a set of artifacts, such as a prompt group or a domain
    ///
    /// Every pair is looked up before anything is written, so an unknown
    /// artifact leaves the workspace unchanged.
    pub fn enable_items(
        &self,
        items: &[(&str, ArtifactType)],
        workspace: &dyn Workspace,
    ) -> Result<usize> {
        self.apply_items(items, workspace, Self::copy_entry)
    }

    /// Disable a set of artifacts, such as a prompt group or a domain
    pub fn disable_items(
        &self,
        items: &[(&str, ArtifactType)],
        workspace: &dyn Workspace,
    ) -> Result<usize> {
        self.apply_items(items, workspace, Self::remove_entry)
    }

    fn apply_items(
        &self,
        items: &[(&str, ArtifactType)],
        workspace: &dyn Workspace,
        action: fn(&Self, &ManifestEntry, &dyn Workspace) -> Result<()>,
    ) -> Result<usize> {
        let entries = items
            .iter()
            .map(|(name, kind)| self.find_entry(name, Some(*kind)))
            .collect::<Result<Vec<_>>>()?;
        for entry in &entries {
            action(self, entry, workspace)?;
        }
        Ok(entries.len())
    }

    fn apply(
        &self,
        kind: Option<ArtifactType>,
        workspace: &dyn Workspace,
        action: fn(&Self, &ManifestEntry, &dyn Workspace) -> Result<()>,
    ) -> Result<usize> {
        let mut count = 0;
        for entry in self
            .manifest
            .artifacts
            .iter()
            .filter(|e| kind.map_or(true, |k| e.kind == k))
        {
            action(self, entry, workspace)?;
            count += 1;
        }
        Ok(count)
    }

    fn copy_entry(&self, entry: &ManifestEntry, workspace: &dyn Workspace) -> Result<()> {
        let bytes = self.bundle.read_bytes(&entry.relative_path)?;
        let target = self.target_path(entry);
        debug!("Enabling {} {} at {:?}", entry.kind, entry.name, target);
        workspace.write(&target, &bytes)
    }

    fn remove_entry(&self, entry: &ManifestEntry, workspace: &dyn Workspace) -> Result<()> {
        let target = self.target_path(entry);
        if workspace.exists(&target) {
            debug!("Disabling {} {} at {:?}", entry.kind, entry.name, target);
            workspace.remove(&target)?;
        }
        Ok(())
    }

    /// Raw markdown of an artifact from the bundle
    pub fn read_text(&self, item: &ArtifactItem) -> Result<String> {
        self.bundle.read_document(&item.path)
    }

    /// Parsed frontmatter and body of an artifact from the bundle
    pub fn read_document(&self, item: &ArtifactItem) -> Result<ParsedDocument> {
        Ok(parse_frontmatter(&self.read_text(item)?))
    }

    /// First-run activation
    ///
    /// Enables the whole bundle once per workspace and records that in
    /// `state`. Returns whether anything was done. The caller saves `state`.
    pub fn initialize(&self, workspace: &dyn Workspace, state: &mut WorkspaceState) -> Result<bool> {
        if state.initialized {
            debug!("Workspace already initialized");
            return Ok(false);
        }

        let count = self.enable_all(workspace)?;
        state.initialized = true;
        info!("Initialized workspace with {} artifacts", count);
        Ok(true)
    }
}

/// Remove a trailing "- Brought to you by ..." credit from a description
pub fn strip_attribution(description: &str) -> String {
    ATTRIBUTION_RE.replace(description, "").trim().to_string()
}

/// Directories under `.github/` that the catalog writes to
pub fn managed_directories(namespace: &str) -> Vec<String> {
    ArtifactType::ALL
        .iter()
        .map(|kind| format!(".github/{}/{}/", kind.subdirectory(), namespace))
        .collect()
}

/// Add the managed directories to the workspace `.gitignore`
///
/// Only lines not already present are appended. Returns the added lines.
pub fn update_gitignore(workspace: &dyn Workspace, namespace: &str) -> Result<Vec<String>> {
    let path = Path::new(GITIGNORE);
    let existing = if workspace.exists(path) {
        workspace.read(path)?
    } else {
        Vec::new()
    };

    let missing: Vec<String> = {
        // Decoded only for comparison; the original bytes are written back untouched
        let text = String::from_utf8_lossy(&existing);
        let present: HashSet<&str> = text.lines().map(str::trim).collect();
        managed_directories(namespace)
            .into_iter()
            .filter(|dir| !present.contains(dir.as_str()))
            .collect()
    };

    if missing.is_empty() {
        debug!(".gitignore already lists managed directories");
        return Ok(missing);
    }

    let mut content = existing;
    if !content.is_empty() && !content.ends_with(b"\n") {
        content.push(b'\n');
    }
    content.push(b'\n');
    content.extend_from_slice(GITIGNORE_HEADER.as_bytes());
    content.push(b'\n');
    content.extend_from_slice(missing.join("\n").as_bytes());
    content.push(b'\n');

    workspace.write(path, &content)?;
    info!("Added {} entries to .gitignore", missing.len());
    Ok(missing)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory workspace
    #[derive(Default)]
    struct MemoryWorkspace {
        files: RefCell<HashMap<PathBuf, Vec<u8>>>,
    }

    impl Workspace for MemoryWorkspace {
        fn exists(&self, path: &Path) -> bool {
            self.files.borrow().contains_key(path)
        }

        fn read(&self, path: &Path) -> Result<Vec<u8>> {
            self.files.borrow().get(path).cloned().ok_or_else(|| {
                CatalogError::io(path, std::io::Error::from(std::io::ErrorKind::NotFound))
            })
        }

        fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), contents.to_vec());
            Ok(())
        }

        fn remove(&self, path: &Path) -> Result<()> {
            self.files.borrow_mut().remove(path);
            Ok(())
        }
    }

    fn entry(name: &str, kind: ArtifactType, description: &str) -> ManifestEntry {
        ManifestEntry {
            name: name.to_string(),
            kind,
            relative_path: format!("{}/{}.{}.md", kind.subdirectory(), name, kind.as_str()),
            description: description.to_string(),
            category: None,
            agent: None,
            prompt: None,
        }
    }

    fn catalog() -> Catalog {
        let manifest = BundledManifest {
            artifacts: vec![
                entry(
                    "task-planner",
                    ArtifactType::Agent,
                    "Plans work - Brought to you by microsoft/hve-core",
                ),
                entry("task-plan", ArtifactType::Prompt, "Create a plan"),
                entry("task-plan", ArtifactType::Instruction, "Plan rules"),
            ],
        };
        Catalog::from_manifest(Bundle::new("/nonexistent"), manifest)
    }

    #[test]
    fn test_target_path() {
        let catalog = catalog();
        let planner = catalog.find_entry("task-planner", None).unwrap();
        assert_eq!(
            catalog.target_path(planner),
            PathBuf::from(".github/agents/hve-core/task-planner.agent.md")
        );

        let catalog = catalog.with_namespace("team");
        let planner = catalog.find_entry("task-planner", None).unwrap();
        assert_eq!(
            catalog.target_path(planner),
            PathBuf::from(".github/agents/team/task-planner.agent.md")
        );
    }

    #[test]
    fn test_find_entry_by_type() {
        let catalog = catalog();
        let instruction = catalog
            .find_entry("task-plan", Some(ArtifactType::Instruction))
            .unwrap();
        assert_eq!(instruction.kind, ArtifactType::Instruction);
        assert_eq!(
            catalog.find_entry("task-plan", None).unwrap().kind,
            ArtifactType::Prompt
        );

        let err = catalog
            .find_entry("task-planner", Some(ArtifactType::Prompt))
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[test]
    fn test_items_reflect_workspace() {
        let catalog = catalog();
        let ws = MemoryWorkspace::default();
        ws.write(Path::new(".github/prompts/hve-core/task-plan.prompt.md"), b"x")
            .unwrap();

        let items = catalog.items(&ws);
        assert_eq!(items.len(), 3);
        let enabled: Vec<_> = items.iter().filter(|i| i.enabled).collect();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].kind, ArtifactType::Prompt);
        assert_eq!(items[0].description, "Plans work");
    }

    #[test]
    fn test_disable_missing_is_noop() {
        let catalog = catalog();
        let ws = MemoryWorkspace::default();
        catalog
            .disable("task-planner", Some(ArtifactType::Agent), &ws)
            .unwrap();
        assert!(catalog.disable("nope", None, &ws).is_err());
    }

    #[test]
    fn test_items_lookup_happens_before_writes() {
        let catalog = catalog();
        let ws = MemoryWorkspace::default();
        let err = catalog
            .enable_items(
                &[
                    ("task-planner", ArtifactType::Agent),
                    ("task-planner", ArtifactType::Prompt),
                ],
                &ws,
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
        assert!(ws.files.borrow().is_empty());
    }

    #[test]
    fn test_strip_attribution() {
        assert_eq!(
            strip_attribution("Does things - brought to you by someone"),
            "Does things"
        );
        assert_eq!(strip_attribution("No credit - here"), "No credit - here");
    }

    #[test]
    fn test_update_gitignore_appends_missing_lines() {
        let ws = MemoryWorkspace::default();
        ws.write(Path::new(".gitignore"), b"target\n.github/agents/hve-core/")
            .unwrap();

        let added = update_gitignore(&ws, "hve-core").unwrap();
        assert_eq!(
            added,
            vec![
                ".github/prompts/hve-core/".to_string(),
                ".github/instructions/hve-core/".to_string()
            ]
        );

        let content = String::from_utf8(ws.read(Path::new(".gitignore")).unwrap()).unwrap();
        assert_eq!(
            content,
            "target\n.github/agents/hve-core/\n\n# HVE Core managed artifacts\n.github/prompts/hve-core/\n.github/instructions/hve-core/\n"
        );

        assert!(update_gitignore(&ws, "hve-core").unwrap().is_empty());
    }

    #[test]
    fn test_update_gitignore_keeps_non_utf8_bytes() {
        let ws = MemoryWorkspace::default();
        ws.write(Path::new(".gitignore"), b"caf\xe9/\n").unwrap();

        update_gitignore(&ws, "hve-core").unwrap();
        let bytes = ws.read(Path::new(".gitignore")).unwrap();
        assert!(bytes.starts_with(b"caf\xe9/\n\n# HVE Core managed artifacts\n"));
        assert!(bytes.ends_with(b".github/instructions/hve-core/\n"));
    }

    #[test]
    fn test_update_gitignore_creates_file() {
        let ws = MemoryWorkspace::default();
        let added = update_gitignore(&ws, "hve-core").unwrap();
        assert_eq!(added.len(), 3);
        let content = String::from_utf8(ws.read(Path::new(".gitignore")).unwrap()).unwrap();
        assert!(content.starts_with("\n# HVE Core managed artifacts\n"));
    }
}
