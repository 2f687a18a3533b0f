//! # Output Formatting
//!
//! Renders the state of a resolution session either as colored text for a
//! terminal or as a single JSON object for scripts.
//!
//! JSON format:
//! ```json
//! {
//!   "documents": [{"url": "http://example.com/svc.asmx?wsdl", "kind": "contract", "name": "Service"}],
//!   "inlineSchemas": ["http://example.com/svc.asmx?wsdl#0"],
//!   "references": [{"url": "http://example.com/svc.asmx?wsdl", "kind": "contract", "state": "resolved"}],
//!   "additionalInfo": 1,
//!   "errors": [],
//!   "manifest": "refs/results.discomap"
//! }
//! ```

use anyhow::Result;
use colored::Colorize;
use disco_core::{ResolutionContext, ResolutionState};
use serde_json::{Value, json};
use std::path::Path;

/// Output format options supported by the CLI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// A single JSON object
    Json,
}

const fn state_label(state: ResolutionState) -> &'static str {
    match state {
        ResolutionState::Unresolved => "unresolved",
        ResolutionState::Resolving => "resolving",
        ResolutionState::Resolved => "resolved",
        ResolutionState::Failed => "failed",
    }
}

/// Build the JSON summary of a session.
pub fn summary_json(session: &ResolutionContext, manifest: Option<&Path>) -> Value {
    let documents: Vec<Value> = session
        .documents()
        .iter()
        .map(|(location, document)| {
            json!({
                "url": location.as_str(),
                "kind": document.kind().label(),
                "name": document.name(),
            })
        })
        .collect();
    let inline: Vec<&str> = session
        .documents()
        .inline_iter()
        .map(|(location, _)| location.as_str())
        .collect();
    let references: Vec<Value> = session
        .references()
        .map(|reference| {
            json!({
                "url": reference.location().as_str(),
                "kind": reference.kind().label(),
                "state": state_label(reference.state()),
            })
        })
        .collect();
    let errors: Vec<Value> = session
        .errors()
        .iter()
        .map(|(location, error)| {
            json!({
                "url": location.as_str(),
                "category": error.category(),
                "message": error.display_chain(),
            })
        })
        .collect();

    json!({
        "documents": documents,
        "inlineSchemas": inline,
        "references": references,
        "additionalInfo": session.additional_information().len(),
        "errors": errors,
        "manifest": manifest.map(|path| path.display().to_string()),
    })
}

/// Print a session summary to stdout.
pub fn print_summary(
    session: &ResolutionContext,
    manifest: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary_json(session, manifest))?
            );
        },
        OutputFormat::Text => print_text(session, manifest),
    }
    Ok(())
}

fn print_text(session: &ResolutionContext, manifest: Option<&Path>) {
    let documents = session.documents();
    println!(
        "{} {}",
        "Documents".bold(),
        format!("({})", documents.len()).dimmed()
    );
    for (location, document) in documents.iter() {
        let kind = format!("{:<9}", document.kind().label());
        match document.name() {
            Some(name) => println!("  {} {} {}", kind.cyan(), location, name.dimmed()),
            None => println!("  {} {}", kind.cyan(), location),
        }
    }
    if documents.inline_len() > 0 {
        println!("  {} inline schema(s)", documents.inline_len());
    }

    let pending: Vec<_> = session
        .references()
        .filter(|reference| reference.state() == ResolutionState::Unresolved)
        .collect();
    if !pending.is_empty() {
        println!();
        println!(
            "{} {}",
            "Unresolved".bold(),
            format!("({})", pending.len()).dimmed()
        );
        for reference in pending {
            println!("  {:<9} {}", reference.kind().label(), reference.location());
        }
    }

    let errors = session.errors();
    if !errors.is_empty() {
        println!();
        println!(
            "{} {}",
            "Errors".bold().red(),
            format!("({})", errors.len()).dimmed()
        );
        for (location, error) in errors {
            println!(
                "  {} {} {}",
                "✗".red(),
                location,
                format!("[{}]", error.category()).yellow()
            );
            println!("    {}", error.display_chain());
        }
    }

    if let Some(path) = manifest {
        println!();
        println!("{} Manifest written to {}", "✓".green(), path.display());
    }
}
