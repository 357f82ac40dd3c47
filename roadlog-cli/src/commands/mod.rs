//! Command handlers -- one module per subcommand

pub mod aggregate;
pub mod config;
pub mod validate_paths;

use std::path::Path;

use roadlog_core::config::RoadlogConfig;

use crate::cli::DEFAULT_CONFIG_PATH;
use crate::error::CliError;

/// Load the effective configuration for a command.
///
/// A missing file at the default location falls back to built-in defaults;
/// any other path must exist.
pub async fn load_config(config_path: &Path) -> Result<RoadlogConfig, CliError> {
    let config = if config_path == Path::new(DEFAULT_CONFIG_PATH) {
        RoadlogConfig::load_or_default(config_path).await?
    } else {
        RoadlogConfig::load(config_path).await?
    };
    Ok(config)
}
