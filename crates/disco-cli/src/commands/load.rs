//! `disco load`

use anyhow::{Context, Result};
use disco_core::ResolutionContext;
use std::path::Path;

use super::finish;
use crate::output::OutputFormat;
use crate::utils::load_config;

/// Read the manifest at `index` and print the summary.
pub async fn execute(
    index: &Path,
    format: OutputFormat,
    strict: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mut session = ResolutionContext::new(config)?;
    session
        .read_all(index)
        .await
        .with_context(|| format!("reading manifest {}", index.display()))?;

    finish(&session, None, format, strict)
}
