// varstore entrypoint
//!
//! Opens one variable and runs a single subcommand against it.

mod args;
mod commands;
mod logging;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use std::path::PathBuf;
use varstore_configs::AppConfig;
use varstore_core::{DistributedContext, Variable};
use varstore_filestore::build_storage;

const DEFAULT_CONFIG_PATH: &str = "varstore.toml";

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let explicit = cli.config.is_some();
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = if explicit || path.exists() {
        AppConfig::from_file(&path)
            .with_context(|| format!("Invalid config {}", path.display()))?
    } else {
        AppConfig::default()
    };

    config.apply_env_overrides()?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.to_lowercase();
    }
    config.finalize()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let log_file = config
        .logging
        .log_to_file
        .then(|| format!("{}/varstore.log", config.logging.logs_path));
    logging::init_logging(
        &config.logging.level,
        log_file.as_deref(),
        config.logging.log_to_console,
        Some(&config.logging.targets),
        &config.logging.format,
    )?;

    let storage = build_storage(&config.storage)?;
    log::debug!("Using storage {}", storage.describe());

    let mut builder = Variable::builder(cli.identity(), storage).settings(config.variables.clone());
    if let Some(variable_type) = cli.variable_type {
        builder = builder.variable_type(variable_type);
    }
    if cli.engine {
        builder = builder.engine(DistributedContext::new());
    }
    let variable = builder.open().await?;

    let output = commands::run(&cli.command, &variable).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
