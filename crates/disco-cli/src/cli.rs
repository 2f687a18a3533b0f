//! # CLI Structure and Argument Parsing
//!
//! This module defines the command-line interface for `disco`. The CLI is
//! built using `clap` with derive macros.
//!
//! ## Usage Patterns
//!
//! ```bash
//! # Resolve everything reachable from a pointer document
//! disco resolve http://example.com/service.disco
//!
//! # Save the documents and an index next to them
//! disco resolve http://example.com/service.disco --out ./refs
//!
//! # Start from a contract or schema instead of a pointer document
//! disco resolve "http://example.com/svc.asmx?wsdl" --any
//!
//! # Reload a saved manifest
//! disco load ./refs/results.discomap --format json
//! ```
//!
//! ## Exit Codes
//!
//! Per-location failures are reported but do not fail the command unless
//! `--strict` is given.

use clap::{Args, Parser, Subcommand};
use disco_core::manifest::DEFAULT_INDEX_NAME;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Main CLI structure for the `disco` command
#[derive(Parser, Clone, Debug)]
#[command(name = "disco")]
#[command(version)]
#[command(about = "disco - resolve web service discovery documents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Read settings from this file instead of the user config file
    #[arg(long, global = true, value_name = "PATH", env = "DISCO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Resolve a document and everything it references
    Resolve(ResolveArgs),

    /// Load a saved manifest, fetching any document missing from it
    Load {
        /// Path to the manifest index file
        #[arg(value_name = "INDEX")]
        index: PathBuf,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Exit with an error if any location failed to resolve
        #[arg(long)]
        strict: bool,
    },
}

/// Arguments for `disco resolve`
#[derive(Args, Clone, Debug)]
pub struct ResolveArgs {
    /// Starting location
    #[arg(value_name = "URL")]
    pub url: String,

    /// Write the resolved documents and an index into this directory
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// File name of the index written with --out
    #[arg(long, value_name = "NAME", default_value = DEFAULT_INDEX_NAME, requires = "out")]
    pub index: String,

    /// Resolve the starting document and its direct children only
    #[arg(long)]
    pub one_level: bool,

    /// Accept a contract or schema as the starting document
    #[arg(long)]
    pub any: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Exit with an error if any location failed to resolve
    #[arg(long)]
    pub strict: bool,
}

impl Commands {
    /// Output format selected for the command.
    pub const fn format(&self) -> OutputFormat {
        match self {
            Self::Resolve(args) => args.format,
            Self::Load { format, .. } => *format,
        }
    }
}
