//! Candidate catalog loading
//!
//! The vault indexer runs elsewhere and hands over its extraction as JSON:
//! an item list (either a bare array or `{"items": [...]}`) and a recency
//! list of paths, most recently opened first.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::search::{CandidateItem, RecencyIndex};

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Bare(Vec<CandidateItem>),
    Wrapped { items: Vec<CandidateItem> },
}

/// Parse a catalog; later duplicates of a path are dropped
pub fn parse_items(data: &str) -> Result<Vec<CandidateItem>> {
    let parsed: CatalogFile = serde_json::from_str(data).context("Failed to parse item catalog")?;
    let items = match parsed {
        CatalogFile::Bare(items) | CatalogFile::Wrapped { items } => items,
    };

    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(item.path.clone()) {
            unique.push(item);
        } else {
            warn!(path = %item.path, "duplicate catalog path ignored");
        }
    }
    Ok(unique)
}

pub fn load_items(path: &Path) -> Result<Vec<CandidateItem>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read item catalog {}", path.display()))?;
    let items = parse_items(&data)?;
    debug!(count = items.len(), path = %path.display(), "catalog loaded");
    Ok(items)
}

/// Load the most-recently-used list; a missing file means nothing was opened yet
pub fn load_recency(path: &Path) -> Result<RecencyIndex> {
    if !path.exists() {
        return Ok(RecencyIndex::default());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read recency list {}", path.display()))?;
    let paths: Vec<String> =
        serde_json::from_str(&data).context("Failed to parse recency list")?;
    Ok(RecencyIndex::from_recent(paths))
}
