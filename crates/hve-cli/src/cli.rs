use clap::{Args, Parser, Subcommand, ValueEnum};
use hve_types::ArtifactType;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hve",
    version,
    about = "Manage HVE Core agents, prompts and instructions in a workspace"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Workspace root (overrides [workspace] path)")]
    pub workspace: Option<PathBuf>,
    #[arg(long, global = true, help = "Bundle directory holding bundled-manifest.json")]
    pub bundle: Option<PathBuf>,
    #[arg(long, global = true, help = "Config file to use instead of ./hve.toml")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enable the whole bundle on first use of a workspace
    Init {
        #[arg(long, help = "Also add the managed directories to .gitignore")]
        gitignore: bool,
    },
    /// Browse enabled artifacts
    List {
        #[arg(long = "type", value_enum)]
        kind: Option<TypeFilter>,
        #[arg(long)]
        by_type: bool,
    },
    /// Show every artifact grouped by domain and prompt
    Sections,
    /// Copy artifacts into the workspace
    Enable(Selection),
    /// Remove artifacts from the workspace
    Disable(Selection),
    /// Show an artifact's details and body
    Show(Target),
    /// List the input parameters of a prompt or agent
    Params(Target),
    /// Print the chat query that runs an artifact
    Run {
        #[command(flatten)]
        target: Target,
        #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// Add or remove a prompt from the favorites
    Favorite { name: String },
    /// Add the managed directories to .gitignore
    Gitignore,
}

#[derive(Args, Debug)]
pub struct Target {
    pub name: String,
    #[arg(long = "type", value_enum)]
    pub kind: Option<KindArg>,
}

impl Target {
    pub fn kind(&self) -> Option<ArtifactType> {
        self.kind.map(ArtifactType::from)
    }
}

#[derive(Args, Debug)]
pub struct Selection {
    #[arg(required_unless_present_any = ["all", "kind", "group", "domain"])]
    pub name: Option<String>,
    #[arg(long = "type", value_enum)]
    pub kind: Option<KindArg>,
    #[arg(long, conflicts_with_all = ["name", "kind"])]
    pub all: bool,
    #[arg(
        long,
        value_name = "PROMPT",
        conflicts_with_all = ["name", "kind", "all", "domain"],
        help = "A prompt together with its agents and instructions"
    )]
    pub group: Option<String>,
    #[arg(
        long,
        value_name = "LABEL",
        conflicts_with_all = ["name", "kind", "all"],
        help = "Every artifact in a domain section, as shown by `hve sections`"
    )]
    pub domain: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum KindArg {
    Agent,
    Prompt,
    Instruction,
}

impl From<KindArg> for ArtifactType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Agent => ArtifactType::Agent,
            KindArg::Prompt => ArtifactType::Prompt,
            KindArg::Instruction => ArtifactType::Instruction,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum TypeFilter {
    Agent,
    Prompt,
    Instruction,
    All,
}

impl TypeFilter {
    pub fn filter(self) -> Option<ArtifactType> {
        match self {
            TypeFilter::Agent => Some(ArtifactType::Agent),
            TypeFilter::Prompt => Some(ArtifactType::Prompt),
            TypeFilter::Instruction => Some(ArtifactType::Instruction),
            TypeFilter::All => None,
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_params() {
        let cli = Cli::try_parse_from([
            "hve", "run", "task-plan", "-p", "topic=retry logic", "--param", "depth=quick",
        ])
        .unwrap();
        let Commands::Run { target, params } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(target.name, "task-plan");
        assert_eq!(
            params,
            vec![
                ("topic".to_string(), "retry logic".to_string()),
                ("depth".to_string(), "quick".to_string())
            ]
        );
    }

    #[test]
    fn test_enable_requires_a_selection() {
        assert!(Cli::try_parse_from(["hve", "enable"]).is_err());
        assert!(Cli::try_parse_from(["hve", "enable", "--all"]).is_ok());
        assert!(Cli::try_parse_from(["hve", "disable", "--type", "agent"]).is_ok());
        assert!(Cli::try_parse_from(["hve", "enable", "x", "--all"]).is_err());
        assert!(Cli::try_parse_from(["hve", "enable", "--all", "--type", "agent"]).is_err());
    }

    #[test]
    fn test_group_and_domain_selections() {
        let cli = Cli::try_parse_from(["hve", "enable", "--group", "task-plan"]).unwrap();
        let Commands::Enable(selection) = cli.command else {
            panic!("expected enable");
        };
        assert_eq!(selection.group.as_deref(), Some("task-plan"));
        assert!(selection.name.is_none());

        let cli = Cli::try_parse_from(["hve", "disable", "--domain", "Azure DevOps"]).unwrap();
        let Commands::Disable(selection) = cli.command else {
            panic!("expected disable");
        };
        assert_eq!(selection.domain.as_deref(), Some("Azure DevOps"));

        assert!(Cli::try_parse_from(["hve", "enable", "--group", "a", "--domain", "Git"]).is_err());
        assert!(Cli::try_parse_from(["hve", "enable", "x", "--group", "a"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "hve", "list", "--type", "all", "--workspace", "/tmp/ws", "--log-level", "debug",
        ])
        .unwrap();
        assert_eq!(cli.workspace, Some(PathBuf::from("/tmp/ws")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Commands::List { kind, by_type } = cli.command else {
            panic!("expected list");
        };
        assert!(kind.unwrap().filter().is_none());
        assert!(!by_type);
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }
}
