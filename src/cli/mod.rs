pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tideline", version)]
#[command(about = "Reports new entries of Atom, RSS and RDF feeds", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.config/tideline/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of parallel workers for fetching feeds
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch all feeds and report entries not seen before
    Run {
        /// Report without saving watermarks
        #[arg(long)]
        dry_run: bool,
    },
    /// Decode a local feed document and print it
    Check {
        /// Path to the feed document
        path: PathBuf,
    },
    /// List configured sources and their watermarks
    Sources,
}
