//! CLI mode implementation
//!
//! Provides command-line access to the switcher engine

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// vault-switcher CLI
#[derive(Parser)]
#[command(name = "vault-switcher")]
#[command(about = "Rank notes by name, alias, tag, header and link as you type", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank the catalog for a single query
    Search(SearchArgs),
    /// Read queries from stdin, one per line, as a live switcher would
    Interactive(SessionArgs),
    /// Inspect configuration
    Config(ConfigArgs),
}

/// Inputs shared by every command that runs the engine
#[derive(Args, Clone, Debug)]
pub struct SessionArgs {
    /// JSON item catalog produced by the vault indexer
    #[arg(short = 'i', long, env = "VAULT_SWITCHER_ITEMS")]
    pub items: PathBuf,

    /// JSON array of paths, most recently opened first
    #[arg(short = 'r', long, env = "VAULT_SWITCHER_RECENT")]
    pub recent: Option<PathBuf>,

    /// Settings file (defaults to the user config directory)
    #[arg(short = 'c', long, env = "VAULT_SWITCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the configured result cap
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Emit JSON instead of markdown
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Query text; several words are matched independently
    #[arg(required = false, num_args = 0..)]
    pub query: Vec<String>,
}

impl SearchArgs {
    pub fn query(&self) -> String {
        self.query.join(" ")
    }
}

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Print the built-in defaults instead of the effective configuration
    #[arg(long)]
    pub print_default: bool,

    /// Settings file to read
    #[arg(short = 'c', long, env = "VAULT_SWITCHER_CONFIG")]
    pub config: Option<PathBuf>,
}
