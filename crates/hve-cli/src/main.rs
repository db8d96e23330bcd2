mod cli;
mod config;
mod render;
mod service;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::Config;
use service::CatalogService;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration, then let command-line flags win
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(workspace) = &cli.workspace {
        config.workspace.path = workspace.to_string_lossy().into_owned();
    }
    if let Some(bundle) = &cli.bundle {
        config.bundle.path = bundle.to_string_lossy().into_owned();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    hve_logging::init_logging(&config.logging.level, config.logging.json)?;

    let service = CatalogService::new(config, cli.json)?;
    service.run(cli.command)
}
