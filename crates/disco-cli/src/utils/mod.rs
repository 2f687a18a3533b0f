//! Shared helpers for the CLI commands.

pub mod logging;

use anyhow::{Context, Result};
use disco_core::DiscoveryConfig;
use std::path::Path;

/// Load settings from `path`, or from the user config file when no path was
/// given. `DISCO_*` environment variables apply in both cases.
pub fn load_config(path: Option<&Path>) -> Result<DiscoveryConfig> {
    match path {
        Some(path) => DiscoveryConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(DiscoveryConfig::load()?),
    }
}
