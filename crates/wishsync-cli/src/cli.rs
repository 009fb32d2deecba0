use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wishsync")]
#[command(about = "Replicate remote wishlists into a local database")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one sync against the remote store (default)
    Sync {
        /// Output the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the sync checkpoint and stored record counts
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the most recently synced wishlists
    List {
        /// Number of wishlists to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
