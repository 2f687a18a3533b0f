//! disco CLI - resolve web service discovery documents
//!
//! This is the main entry point for the disco command-line interface.
//! Command implementations live in [`commands`].

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::logging::initialize_logging(&cli)?;

    execute_command(&cli).await
}

async fn execute_command(cli: &Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, config).await,
        Commands::Load {
            index,
            format,
            strict,
        } => commands::load::execute(index, *format, *strict, config).await,
    }
}
