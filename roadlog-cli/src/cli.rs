//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// roadlog -- simulation event-log correlation and path validation.
///
/// Use `roadlog <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "roadlog", version, about, long_about = None)]
pub struct Cli {
    /// Path to the roadlog.toml configuration file.
    ///
    /// When left at the default and the file does not exist, built-in
    /// defaults (plus environment overrides) are used.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "roadlog.toml";

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Correlate every log/config pair in a data directory into per-run-group tables.
    Aggregate(AggregateArgs),

    /// Report row-crossing moves in the raw paths of one simulation log.
    ValidatePaths(ValidatePathsArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- aggregate ----

/// Correlate a data directory of `<nodes>-<cars>-<instance>.{log,xml}` pairs.
#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Directory holding the simulation logs and configuration documents.
    #[arg(short = 'd', long)]
    pub data_dir: PathBuf,

    /// Write one merged table to this file instead of one table per run group.
    #[arg(short = 'o', long)]
    pub merged_output: Option<PathBuf>,

    /// Override the output directory for per-run-group tables.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Process run groups one after another instead of in parallel.
    #[arg(long)]
    pub sequential: bool,
}

// ---- validate-paths ----

/// Scan one simulation log for invalid adjacent path nodes.
#[derive(Args, Debug)]
pub struct ValidatePathsArgs {
    /// Simulation log to scan.
    pub log: PathBuf,

    /// Override the grid row width.
    #[arg(long)]
    pub row_width: Option<i64>,
}

// ---- config ----

/// Manage roadlog configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, correlator, validator).
        #[arg(long)]
        section: Option<String>,
    },
}
