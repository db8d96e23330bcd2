use crate::cli::{Commands, Selection, Target};
use crate::config::Config;
use crate::render;
use anyhow::{anyhow, bail, Context, Result};
use hve_catalog::{
    build_tree, find_group, find_section, update_gitignore, Bundle, Catalog, FsWorkspace,
    GroupingEngine, RunRequest, ViewOptions, WorkspaceState,
};
use hve_markdown::parse_parameters;
use hve_types::{ArtifactItem, ArtifactType};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Catalog service - dispatches CLI commands against one workspace
pub struct CatalogService {
    config: Config,
    catalog: Catalog,
    workspace: FsWorkspace,
    engine: GroupingEngine,
    json: bool,
}

/// Artifacts an enable or disable command applies to
enum Scope {
    One(String, Option<ArtifactType>),
    /// A prompt group or domain section, with its label
    Items(String, Vec<(String, ArtifactType)>),
    Type(ArtifactType),
    All,
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches(['/', '\\'])),
        _ => PathBuf::from(path),
    }
}

impl CatalogService {
    /// Load the bundle and bind it to the configured workspace
    pub fn new(config: Config, json: bool) -> Result<Self> {
        if config.bundle.path.trim().is_empty() {
            bail!("No bundle configured: pass --bundle, set HVE_BUNDLE_DIR or [bundle] path");
        }

        let bundle = Bundle::new(expand_home(&config.bundle.path));
        let catalog = Catalog::load(bundle)
            .with_context(|| format!("Failed to load bundle from {}", config.bundle.path))?
            .with_namespace(config.workspace.namespace.clone());
        let workspace = FsWorkspace::new(expand_home(&config.workspace.path));
        let engine = GroupingEngine::new(config.overrides.clone());

        info!(
            "Workspace {:?}, namespace {}, {} override(s)",
            workspace.root(),
            catalog.namespace(),
            config.overrides.agents.len() + config.overrides.instructions.len()
        );

        Ok(Self {
            config,
            catalog,
            workspace,
            engine,
            json,
        })
    }

    /// Run one command
    pub fn run(&self, command: Commands) -> Result<()> {
        debug!("Running {:?}", command);
        match command {
            Commands::Init { gitignore } => self.init(gitignore),
            Commands::List { kind, by_type } => {
                let mut options = self.config.view.options()?;
                if let Some(kind) = kind {
                    options.type_filter = kind.filter();
                }
                options.group_by_type |= by_type;
                self.list(&options)
            }
            Commands::Sections => self.sections(),
            Commands::Enable(selection) => self.toggle(&selection, true),
            Commands::Disable(selection) => self.toggle(&selection, false),
            Commands::Show(target) => self.show(&target),
            Commands::Params(target) => self.params(&target),
            Commands::Run { target, params } => self.run_query(&target, &params),
            Commands::Favorite { name } => self.favorite(&name),
            Commands::Gitignore => self.gitignore(),
        }
    }

    fn namespace(&self) -> &str {
        self.catalog.namespace()
    }

    fn state(&self) -> Result<WorkspaceState> {
        Ok(WorkspaceState::load(&self.workspace, self.namespace())?)
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn init(&self, gitignore: bool) -> Result<()> {
        let mut state = self.state()?;
        if self.catalog.initialize(&self.workspace, &mut state)? {
            state.save(&self.workspace, self.namespace())?;
            println!(
                "Enabled {} artifacts in {}",
                self.catalog.entries().len(),
                self.workspace.root().display()
            );
        } else {
            println!("Workspace already initialized");
        }

        if gitignore {
            self.gitignore()?;
        }
        Ok(())
    }

    fn list(&self, options: &ViewOptions) -> Result<()> {
        let tree = build_tree(&self.catalog.items(&self.workspace), options);
        if self.json {
            return self.print_json(&tree);
        }
        if tree.is_empty() {
            println!("No enabled artifacts. Run `hve init` or `hve enable`.");
            return Ok(());
        }
        print!("{}", render::render_tree(&tree, &self.state()?));
        Ok(())
    }

    fn sections(&self) -> Result<()> {
        let sections = self
            .engine
            .build_domain_sections(&self.catalog.items(&self.workspace));
        if self.json {
            return self.print_json(&sections);
        }
        print!("{}", render::render_sections(&sections, &self.state()?));
        Ok(())
    }

    /// Resolve a selection to the artifacts it names
    fn scope(&self, selection: &Selection) -> Result<Scope> {
        let kind = selection.kind.map(ArtifactType::from);
        if let Some(name) = &selection.name {
            return Ok(Scope::One(name.clone(), kind));
        }

        let sections = self
            .engine
            .build_domain_sections(&self.catalog.items(&self.workspace));
        let (label, members): (String, Vec<&ArtifactItem>) =
            match (&selection.group, &selection.domain) {
                (Some(prompt), _) => {
                    let group = find_group(&sections, prompt)
                        .ok_or_else(|| anyhow!("No prompt group named '{}'", prompt))?;
                    (format!("group {}", group.prompt.name), group.items().collect())
                }
                (None, Some(domain)) => {
                    let section = find_section(&sections, domain)
                        .ok_or_else(|| anyhow!("No domain section named '{}'", domain))?;
                    (format!("domain {}", section.domain), section.items().collect())
                }
                (None, None) => {
                    return Ok(match kind {
                        Some(kind) => Scope::Type(kind),
                        None => Scope::All,
                    })
                }
            };

        let members = members.iter().map(|i| (i.name.clone(), i.kind)).collect();
        Ok(Scope::Items(label, members))
    }

    fn toggle(&self, selection: &Selection, enable: bool) -> Result<()> {
        let verb = if enable { "Enabled" } else { "Disabled" };
        let ws = &self.workspace;

        match self.scope(selection)? {
            Scope::One(name, kind) => {
                if enable {
                    self.catalog.enable(&name, kind, ws)?;
                } else {
                    self.catalog.disable(&name, kind, ws)?;
                }
                println!("{} {}", verb, name);
            }
            Scope::Items(label, members) => {
                let members: Vec<(&str, ArtifactType)> =
                    members.iter().map(|(n, k)| (n.as_str(), *k)).collect();
                let count = if enable {
                    self.catalog.enable_items(&members, ws)?
                } else {
                    self.catalog.disable_items(&members, ws)?
                };
                println!("{} {} artifacts in {}", verb, count, label);
            }
            Scope::Type(kind) => {
                let count = if enable {
                    self.catalog.enable_by_type(kind, ws)?
                } else {
                    self.catalog.disable_by_type(kind, ws)?
                };
                println!("{} {} {} artifacts", verb, count, kind);
            }
            Scope::All => {
                let count = if enable {
                    self.catalog.enable_all(ws)?
                } else {
                    self.catalog.disable_all(ws)?
                };
                println!("{} {} artifacts", verb, count);
            }
        }
        Ok(())
    }

    fn item(&self, target: &Target) -> Result<ArtifactItem> {
        Ok(self
            .catalog
            .item(&target.name, target.kind(), &self.workspace)?)
    }

    fn show(&self, target: &Target) -> Result<()> {
        let item = self.item(target)?;
        let doc = self.catalog.read_document(&item)?;
        if self.json {
            #[derive(Serialize)]
            struct Detail<'a> {
                #[serde(flatten)]
                item: &'a ArtifactItem,
                frontmatter: &'a hve_types::Frontmatter,
                body: &'a str,
            }
            return self.print_json(&Detail {
                item: &item,
                frontmatter: &doc.frontmatter,
                body: &doc.body,
            });
        }
        print!("{}", render::render_detail(&item, &doc));
        Ok(())
    }

    fn params(&self, target: &Target) -> Result<()> {
        let item = self.item(target)?;
        let params = parse_parameters(&self.catalog.read_document(&item)?.body);
        if self.json {
            return self.print_json(&params);
        }
        print!("{}", render::render_params(&params));
        Ok(())
    }

    fn run_query(&self, target: &Target, values: &[(String, String)]) -> Result<()> {
        let item = self.item(target)?;
        let params = parse_parameters(&self.catalog.read_document(&item)?.body);

        let mut request = RunRequest::new(&item, params)?;
        for (name, value) in values {
            request.set(name, value.as_str())?;
        }
        let query = request.compose()?;

        if self.json {
            return self.print_json(&serde_json::json!({ "query": query }));
        }
        println!("{}", query);
        Ok(())
    }

    fn favorite(&self, name: &str) -> Result<()> {
        // Favorites only apply to prompts
        let entry = self.catalog.find_entry(name, Some(ArtifactType::Prompt))?;
        let mut state = self.state()?;
        let added = state.toggle_favorite(&entry.name);
        state.save(&self.workspace, self.namespace())?;
        if added {
            println!("Added {} to favorites", entry.name);
        } else {
            println!("Removed {} from favorites", entry.name);
        }
        Ok(())
    }

    fn gitignore(&self) -> Result<()> {
        let added = update_gitignore(&self.workspace, self.namespace())?;
        if added.is_empty() {
            println!(".gitignore already covers the managed directories");
        } else {
            for line in &added {
                println!("Added {} to .gitignore", line);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use hve_catalog::ResolutionOverrides;

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/opt/bundle"), PathBuf::from("/opt/bundle"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/bundle"), home.join("bundle"));
        }
    }

    const MANIFEST: &str = r#"{"artifacts": [
        {"name": "task-plan", "type": "prompt", "relativePath": "prompts/task-plan.prompt.md"},
        {"name": "task-planner", "type": "agent", "relativePath": "agents/task-planner.agent.md"},
        {"name": "task-plan-instructions", "type": "instruction",
         "relativePath": "instructions/task-plan-instructions.instructions.md"},
        {"name": "git-commit", "type": "prompt", "relativePath": "prompts/git-commit.prompt.md"}
    ]}"#;

    fn service(bundle: &std::path::Path, workspace: &std::path::Path) -> CatalogService {
        let files = [
            ("bundled-manifest.json", MANIFEST),
            ("bundled/prompts/task-plan.prompt.md", "plan"),
            ("bundled/agents/task-planner.agent.md", "planner"),
            (
                "bundled/instructions/task-plan-instructions.instructions.md",
                "rules",
            ),
            ("bundled/prompts/git-commit.prompt.md", "commit"),
        ];
        for (path, content) in files {
            let path = bundle.join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        let mut config = Config::default();
        config.bundle.path = bundle.to_string_lossy().into_owned();
        config.workspace.path = workspace.to_string_lossy().into_owned();
        config.overrides = ResolutionOverrides::new().with_agent("task-planner", "task-plan");
        CatalogService::new(config, false).unwrap()
    }

    fn selection() -> Selection {
        Selection {
            name: None,
            kind: None,
            all: false,
            group: None,
            domain: None,
        }
    }

    #[test]
    fn test_enable_group_writes_prompt_and_children() {
        let bundle = tempfile::tempdir().unwrap();
        let workspace = tempfile::tempdir().unwrap();
        let service = service(bundle.path(), workspace.path());

        service
            .run(Commands::Enable(Selection {
                group: Some("task-plan".to_string()),
                ..selection()
            }))
            .unwrap();

        let github = workspace.path().join(".github");
        assert!(github.join("prompts/hve-core/task-plan.prompt.md").is_file());
        assert!(github.join("agents/hve-core/task-planner.agent.md").is_file());
        assert!(github
            .join("instructions/hve-core/task-plan-instructions.instructions.md")
            .is_file());
        assert!(!github.join("prompts/hve-core/git-commit.prompt.md").exists());
    }

    #[test]
    fn test_disable_domain_leaves_other_domains() {
        let bundle = tempfile::tempdir().unwrap();
        let workspace = tempfile::tempdir().unwrap();
        let service = service(bundle.path(), workspace.path());
        service
            .run(Commands::Enable(Selection {
                all: true,
                ..selection()
            }))
            .unwrap();

        service
            .run(Commands::Disable(Selection {
                domain: Some("rpi".to_string()),
                ..selection()
            }))
            .unwrap();

        let github = workspace.path().join(".github");
        assert!(!github.join("prompts/hve-core/task-plan.prompt.md").exists());
        assert!(!github.join("agents/hve-core/task-planner.agent.md").exists());
        assert!(github.join("prompts/hve-core/git-commit.prompt.md").is_file());
    }

    #[test]
    fn test_unknown_group_is_an_error() {
        let bundle = tempfile::tempdir().unwrap();
        let workspace = tempfile::tempdir().unwrap();
        let service = service(bundle.path(), workspace.path());
        let err = service
            .run(Commands::Enable(Selection {
                group: Some("task-planner".to_string()),
                ..selection()
            }))
            .unwrap_err();
        assert!(err.to_string().contains("No prompt group named 'task-planner'"));
    }

    #[test]
    fn test_missing_bundle_is_an_error() {
        let err = CatalogService::new(Config::default(), false)
            .err()
            .expect("service without bundle must fail");
        assert!(err.to_string().contains("No bundle configured"));
    }
}
