//! Debounced search session
//!
//! A session owns the immutable candidate list and recency snapshot for one
//! switcher invocation. Items are normalized once, when the session starts. Every keystroke calls [`SearchSession::submit`]; a
//! newer submission cancels the previous one, whether it is still waiting out
//! the debounce window or already matching on a blocking thread. Only the
//! latest query ever yields an outcome.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::error::{ConfigError, SearchError};
use crate::search::{CandidateItem, PreparedCatalog, RecencyIndex, SearchEngine, SearchOutcome};

pub struct SearchSession {
    engine: Arc<SearchEngine>,
    catalog: Arc<PreparedCatalog>,
    recency: Arc<RecencyIndex>,
    debounce: Duration,
    current: Mutex<CancellationToken>,
}

impl SearchSession {
    /// Start a session; an invalid configuration is rejected here, before any query runs
    pub fn new(
        config: SearchConfig,
        items: Vec<CandidateItem>,
        recency: RecencyIndex,
    ) -> Result<Self, ConfigError> {
        let debounce = config.debounce();
        let engine = SearchEngine::new(config)?;
        let catalog = engine.prepare(items);
        info!(
            items = catalog.len(),
            recent = recency.len(),
            debounce_ms = debounce.as_millis() as u64,
            "search session started"
        );

        Ok(Self {
            engine: Arc::new(engine),
            catalog: Arc::new(catalog),
            recency: Arc::new(recency),
            debounce,
            current: Mutex::new(CancellationToken::new()),
        })
    }

    pub fn item_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Evaluate `query` unless a newer submission supersedes it.
    ///
    /// Returns `Ok(None)` for superseded queries.
    pub async fn submit(&self, query: impl Into<String>) -> Result<Option<SearchOutcome>, SearchError> {
        let query = query.into();
        let token = self.begin();

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(query = %query, "superseded while debouncing");
                return Ok(None);
            }
            _ = tokio::time::sleep(self.debounce) => {}
        }

        let engine = Arc::clone(&self.engine);
        let catalog = Arc::clone(&self.catalog);
        let recency = Arc::clone(&self.recency);
        let task_token = token.clone();
        let handle = tokio::task::spawn_blocking(move || {
            engine.search_prepared(&query, &catalog, &recency, &task_token)
        });

        match handle.await {
            Ok(Ok(_)) if token.is_cancelled() => Ok(None),
            Ok(Ok(outcome)) => Ok(Some(outcome)),
            Ok(Err(SearchError::Cancelled)) => Ok(None),
            Ok(Err(err)) => Err(err),
            Err(join) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
            Err(_) => Ok(None),
        }
    }

    /// Cancel whatever is in flight without starting a new query
    pub fn cancel_pending(&self) {
        self.lock_current().cancel();
    }

    fn begin(&self) -> CancellationToken {
        let mut current = self.lock_current();
        current.cancel();
        *current = CancellationToken::new();
        current.clone()
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, CancellationToken> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
