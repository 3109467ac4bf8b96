//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Infinite-scroll book search from the terminal
#[derive(Parser, Debug)]
#[command(name = "shelfscroll")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Search endpoint, overrides the config file
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search and print results
    Search {
        /// Search text
        query: String,

        /// Number of pages to load
        #[arg(short, long, default_value = "1")]
        pages: u32,
    },

    /// Read queries from stdin; an empty line loads the next page, `:r` reloads, `:q` quits
    Interactive,

    /// Print the effective configuration
    Config,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON view per line
    Json,
    /// Human-readable output
    Pretty,
}
