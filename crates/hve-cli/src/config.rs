use anyhow::{Context, Result};
use hve_catalog::{ResolutionOverrides, ViewOptions, DEFAULT_NAMESPACE};
use hve_types::ArtifactType;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config template created when no config exists
const DEFAULT_CONFIG: &str = r#"
[bundle]
path = ""  # Set via HVE_BUNDLE_DIR env var

[workspace]
path = "."  # Set via HVE_WORKSPACE_DIR env var
namespace = "hve-core"

[view]
group_by_type = false
type_filter = "prompt"  # agent, prompt, instruction or all

[logging]
level = "warn"  # trace, debug, info, warn, error
json = false

# Attach agents and instructions to a prompt when their names do not line up
[overrides.agents]
task-planner = "task-plan"

[overrides.instructions]
"#;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BundleConfig {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_path")]
    pub path: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            path: default_workspace_path(),
            namespace: default_namespace(),
        }
    }
}

fn default_workspace_path() -> String {
    ".".to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewConfig {
    #[serde(default)]
    pub group_by_type: bool,
    #[serde(default = "default_type_filter")]
    pub type_filter: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            group_by_type: false,
            type_filter: default_type_filter(),
        }
    }
}

fn default_type_filter() -> String {
    "prompt".to_string()
}

impl ViewConfig {
    /// Resolve the configured filter; `all` disables filtering
    pub fn options(&self) -> Result<ViewOptions> {
        let type_filter = match self.type_filter.trim() {
            "" | "all" => None,
            other => Some(
                other
                    .parse::<ArtifactType>()
                    .map_err(anyhow::Error::msg)
                    .context("Invalid [view] type_filter")?,
            ),
        };
        Ok(ViewOptions {
            group_by_type: self.group_by_type,
            type_filter,
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub bundle: BundleConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub overrides: ResolutionOverrides,
}

impl Config {
    /// Get the global config path: ~/.hve/hve.toml
    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".hve").join("hve.toml"))
    }

    /// Ensure global config directory and file exist, creating defaults if needed
    fn ensure_global_config() -> Result<Option<PathBuf>> {
        let Some(config_path) = Self::global_config_path() else {
            return Ok(None);
        };

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir).with_context(|| {
                    format!("Failed to create config directory {}", config_dir.display())
                })?;
                eprintln!("Created config directory: {}", config_dir.display());
            }
        }

        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG.trim())
                .with_context(|| format!("Failed to write {}", config_path.display()))?;
            eprintln!("Created default config: {}", config_path.display());
        }

        Ok(Some(config_path))
    }

    /// Load configuration with layered approach:
    /// 1. Global config: ~/.hve/hve.toml (auto-created if missing)
    /// 2. Local override: ./hve.toml, or the file passed with --config
    /// 3. Environment variables with the HVE__ prefix
    /// 4. HVE_BUNDLE_DIR / HVE_WORKSPACE_DIR (highest priority)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let mut config_builder = config::Config::builder();

        // Layer 1: Global config
        if let Some(global_config_path) = Self::ensure_global_config()? {
            config_builder = config_builder.add_source(config::File::from(global_config_path));
        }

        // Layer 2: Explicit file must exist, the local one is optional
        config_builder = match explicit {
            Some(path) => config_builder.add_source(config::File::from(path.to_path_buf())),
            None => config_builder.add_source(config::File::with_name("hve").required(false)),
        };

        // Layer 3: Environment variables with HVE__ prefix
        config_builder = config_builder.add_source(
            config::Environment::with_prefix("HVE")
                .prefix_separator("__")
                .separator("__"),
        );

        // Layer 4: Convenience env var overrides
        if let Ok(dir) = env::var("HVE_BUNDLE_DIR") {
            config_builder = config_builder.set_override("bundle.path", dir)?;
        }

        if let Ok(dir) = env::var("HVE_WORKSPACE_DIR") {
            config_builder = config_builder.set_override("workspace.path", dir)?;
        }

        let config = config_builder
            .build()
            .context("Failed to read configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Invalid configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.workspace.namespace, "hve-core");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(
            config.overrides.agents.get("task-planner").map(String::as_str),
            Some("task-plan")
        );
        assert!(config.overrides.instructions.is_empty());

        let options = config.view.options().unwrap();
        assert_eq!(options.type_filter, Some(ArtifactType::Prompt));
        assert!(!options.group_by_type);
    }

    #[test]
    fn test_override_keys_survive_layered_loading() {
        let text = r#"
[overrides.agents]
Task-Planner = "task-plan"

[overrides.instructions]
"Commit-Rules" = "git-commit"
"#;
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.overrides.agent_prompt("Task-Planner"), Some("task-plan"));
        assert_eq!(config.overrides.agent_prompt("task-planner"), Some("task-plan"));
        assert_eq!(
            config.overrides.instruction_prompt("Commit-Rules"),
            Some("git-commit")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.workspace.path, ".");
        assert_eq!(config.view.type_filter, "prompt");
        assert!(config.bundle.path.is_empty());
        assert!(config.overrides.is_empty());
    }

    #[test]
    fn test_view_filter_all_and_invalid() {
        let config: Config = toml::from_str(
            r#"
[view]
group_by_type = true
type_filter = "all"
"#,
        )
        .unwrap();
        let options = config.view.options().unwrap();
        assert!(options.group_by_type);
        assert_eq!(options.type_filter, None);

        let bad = ViewConfig {
            group_by_type: false,
            type_filter: "skills".to_string(),
        };
        assert!(bad.options().is_err());
    }

    #[test]
    fn test_instruction_overrides() {
        let config: Config = toml::from_str(
            r#"
[overrides.instructions]
"commit-message" = "git-commit"
"#,
        )
        .unwrap();
        assert_eq!(
            config.overrides.instructions.get("commit-message").map(String::as_str),
            Some("git-commit")
        );
    }
}
