//! vault-switcher CLI (Rust)
//!
//! Drives the switcher engine from the command line:
//! - `search` ranks a catalog for one query
//! - `interactive` reads queries from stdin as keystrokes, with debouncing
//! - `config` prints the effective or default settings

mod cli;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConfigArgs, SearchArgs, SessionArgs};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vault_switcher::catalog::{load_items, load_recency};
use vault_switcher::config::{config_path, load_config, SearchConfig};
use vault_switcher::search::{CandidateItem, RecencyIndex};
use vault_switcher::{AppError, SearchEngine, SearchSession};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flags
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr) // Log to stderr to keep stdout clean
        .init();

    let result = match cli.command {
        Commands::Search(args) => execute_search(args),
        Commands::Interactive(args) => execute_interactive(args).await,
        Commands::Config(args) => execute_config(args),
    };

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn resolve_config(path: Option<&std::path::Path>) -> Result<SearchConfig, AppError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    load_config(&path).map_err(|e| {
        warn!(path = %path.display(), "configuration rejected: {:#}", e);
        AppError::InvalidConfig(format!("{:#}", e))
    })
}

/// Settings, catalog and recency snapshot for one session
fn load_inputs(
    args: &SessionArgs,
) -> Result<(SearchConfig, Vec<CandidateItem>, RecencyIndex), AppError> {
    let mut config = resolve_config(args.config.as_deref())?;
    if let Some(limit) = args.limit {
        if limit == 0 {
            return Err(AppError::InvalidInput("--limit must be at least 1".to_string()));
        }
        config.max_results = limit;
    }

    let items = load_items(&args.items)
        .map_err(|e| AppError::CatalogLoadFailed(format!("{:#}", e)))?;
    let recency = match &args.recent {
        Some(path) => {
            load_recency(path).map_err(|e| AppError::CatalogLoadFailed(format!("{:#}", e)))?
        }
        None => RecencyIndex::default(),
    };

    Ok((config, items, recency))
}

fn execute_search(args: SearchArgs) -> Result<String, AppError> {
    let (config, items, recency) = load_inputs(&args.session)?;
    let engine = SearchEngine::new(config)?;

    let query = args.query();
    let outcome = engine.search(&query, &items, &recency);

    if args.session.json {
        return Ok(serde_json::to_string_pretty(&outcome)?);
    }
    let tokens = engine.parse(&query).tokens;
    Ok(output::format_outcome(
        &outcome,
        &tokens,
        engine.config().normalize_diacritics,
    ))
}

async fn execute_interactive(args: SessionArgs) -> Result<String, AppError> {
    let (config, items, recency) = load_inputs(&args)?;
    let session = Arc::new(SearchSession::new(config, items, recency)?);
    info!(items = session.item_count(), "reading queries from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let session = Arc::clone(&session);
        let json = args.json;
        pending.push(tokio::spawn(async move {
            let tokens = session.engine().parse(&line).tokens;
            let fold = session.engine().config().normalize_diacritics;
            match session.submit(line).await {
                Ok(Some(outcome)) if json => match serde_json::to_string(&outcome) {
                    Ok(text) => println!("{}", text),
                    Err(e) => eprintln!("Error: {}", e),
                },
                Ok(Some(outcome)) => println!("{}", output::format_outcome(&outcome, &tokens, fold)),
                Ok(None) => {}
                Err(e) => eprintln!("Error: {}", e),
            }
        }));
    }

    for task in pending {
        task.await
            .map_err(|e| AppError::Internal(format!("query task failed: {}", e)))?;
    }
    Ok(String::new())
}

fn execute_config(args: ConfigArgs) -> Result<String, AppError> {
    let config = if args.print_default {
        SearchConfig::default()
    } else {
        resolve_config(args.config.as_deref())?
    };
    Ok(serde_json::to_string_pretty(&config)?)
}
