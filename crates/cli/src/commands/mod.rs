//! CLI subcommands.

pub mod chat;
pub mod classify;
pub mod init;
pub mod serve;
pub mod session;

use skimmer_config::AppConfig;
use std::path::Path;

/// Load the config from `path`, or from the default location.
pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    config.map_err(|e| format!("Failed to load config: {e}").into())
}
