//! roadlog CLI -- simulation event-log correlation and path validation
//!
//! # Subcommands
//!
//! - `aggregate`: correlate a data directory into per-run-group tables
//! - `validate-paths`: report row-crossing moves in one simulation log
//! - `config`: validate or show the effective configuration

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use roadlog_core::config::GeneralConfig;

use cli::{Cli, Commands};
use error::CliError;
use output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    // `config` reports load failures itself
    let config = match &cli.command {
        Commands::Config(_) => None,
        _ => Some(commands::load_config(&cli.config).await?),
    };

    let mut general = config
        .as_ref()
        .map(|c| c.general.clone())
        .unwrap_or_else(GeneralConfig::default);
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }
    init_logging(&general)?;
    roadlog_core::metrics::describe_all();

    tracing::debug!(config = %cli.config.display(), "roadlog starting");

    match (cli.command, config) {
        (Commands::Aggregate(args), Some(config)) => {
            commands::aggregate::execute(args, &config, &writer).await
        }
        (Commands::ValidatePaths(args), Some(config)) => {
            commands::validate_paths::execute(args, &config, &writer).await
        }
        (Commands::Config(args), _) => commands::config::execute(args, &cli.config, &writer).await,
        (_, None) => Err(CliError::Config("configuration was not loaded".to_owned())),
    }
}

fn init_logging(general: &GeneralConfig) -> Result<(), CliError> {
    logging::init_tracing(general).map_err(|e: anyhow::Error| CliError::Config(format!("{e:#}")))
}
