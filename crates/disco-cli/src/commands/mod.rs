//! Command implementations.

pub mod load;
pub mod resolve;

use anyhow::{Result, bail};
use disco_core::ResolutionContext;
use std::path::Path;

use crate::output::{OutputFormat, print_summary};

/// Print the session summary and apply `--strict`.
fn finish(
    session: &ResolutionContext,
    manifest: Option<&Path>,
    format: OutputFormat,
    strict: bool,
) -> Result<()> {
    print_summary(session, manifest, format)?;
    let failures = session.errors().len();
    if strict && failures > 0 {
        bail!("{failures} location(s) failed to resolve");
    }
    Ok(())
}
