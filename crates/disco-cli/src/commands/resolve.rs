//! `disco resolve`

use anyhow::Result;
use disco_core::{ResolutionContext, ResolutionState};
use tracing::{debug, info};

use super::finish;
use crate::cli::ResolveArgs;
use crate::utils::load_config;
use std::path::Path;

/// Resolve `args.url`, optionally write a manifest and print the summary.
pub async fn execute(args: &ResolveArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let mut session = ResolutionContext::new(config)?;

    if args.any {
        let kind = session.discover_any(&args.url).await?.kind();
        info!("{} is a {} document", args.url, kind);
        if args.one_level {
            resolve_registered(&mut session).await?;
        } else {
            session.resolve_pending().await?;
        }
    } else if args.one_level {
        session.resolve_one_level(&args.url).await?;
    } else {
        session.resolve_all(&args.url).await?;
    }

    let manifest = match &args.out {
        Some(dir) => {
            let index = session.write_all(dir, &args.index)?;
            info!("wrote {} documents to {}", session.documents().len(), dir.display());
            Some(index)
        },
        None => None,
    };

    finish(&session, manifest.as_deref(), args.format, args.strict)
}

/// Resolve every reference currently registered but not yet attempted.
async fn resolve_registered(session: &mut ResolutionContext) -> Result<()> {
    let pending: Vec<_> = session
        .references()
        .filter(|reference| reference.state() == ResolutionState::Unresolved)
        .map(|reference| reference.location().clone())
        .collect();
    debug!("resolving {} direct children", pending.len());
    for location in &pending {
        session.resolve(location).await?;
    }
    Ok(())
}
