//! wishsync CLI - Replicate remote wishlists into a local database
//!
//! Meant to be invoked by a scheduler; each `wishsync sync` is one run.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::resolve_db_path;
use crate::commands::list::run_list;
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "wishsync=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path);
    tracing::debug!("Using database at {}", db_path.display());

    match cli.command.unwrap_or(Commands::Sync { json: false }) {
        Commands::Sync { json } => run_sync(json, &db_path).await?,
        Commands::Status { json } => run_status(json, &db_path).await?,
        Commands::List { limit, json } => run_list(limit, json, &db_path).await?,
    }

    Ok(())
}
