//! Search Engine Integration
//!
//! Ties together query parsing, facet matching, aggregation and ranking
//! to turn a keystroke's query into a ranked, truncated suggestion list.

use rayon::prelude::*;
use std::convert::Infallible;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::aggregate::{retain_eligible, Aggregator, Stamped};
use super::fuzzy::FuzzyMatcher;
use super::item::{CandidateItem, SearchOutcome};
use super::matchers::MatchContext;
use super::parser::{ParsedQuery, QueryParser};
use super::prepared::{normalize_all, NormalizedFacets, PreparedCatalog};
use super::ranking::{empty_query_priorities, rank, truncate, PriorityRule, RecencyIndex};
use crate::config::SearchConfig;
use crate::error::{ConfigError, SearchError};

/// Item count below which matching stays on the calling thread
pub(crate) const PARALLEL_THRESHOLD: usize = 2048;

/// Cooperative stop signal polled between items
trait Interrupt: Sync {
    type Error: Send;

    fn check(&self) -> Result<(), Self::Error>;
}

impl Interrupt for CancellationToken {
    type Error = SearchError;

    fn check(&self) -> Result<(), SearchError> {
        if self.is_cancelled() {
            Err(SearchError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// For callers without a token
struct Uninterruptible;

impl Interrupt for Uninterruptible {
    type Error = Infallible;

    fn check(&self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Validated configuration plus everything derived from it.
///
/// Stateless between calls; one engine serves every query of a session.
pub struct SearchEngine {
    config: SearchConfig,
    aggregator: Aggregator,
    empty_query_priorities: Vec<PriorityRule>,
}

impl SearchEngine {
    /// Validate `config`; an invalid one never produces an engine
    pub fn new(config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let empty_query_priorities = empty_query_priorities(&config.sort_priorities);

        Ok(Self {
            config,
            aggregator: Aggregator::new(),
            empty_query_priorities,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn parse(&self, query: &str) -> ParsedQuery {
        QueryParser::parse(query, self.config.normalize_diacritics)
    }

    /// Normalize `items` once for every later [`SearchEngine::search_prepared`]
    pub fn prepare(&self, items: Vec<CandidateItem>) -> PreparedCatalog {
        PreparedCatalog::new(items, self.config.normalize_diacritics)
    }

    /// Rank `items` for `query`
    pub fn search(
        &self,
        query: &str,
        items: &[CandidateItem],
        recency: &RecencyIndex,
    ) -> SearchOutcome {
        let parsed = self.parse(query);
        let facets = self.facets_for(&parsed, items);
        match self.evaluate(&parsed, items, &facets, recency, &Uninterruptible) {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        }
    }

    /// Rank `items` for `query`, giving up early once `cancel` fires
    pub fn search_cancellable(
        &self,
        query: &str,
        items: &[CandidateItem],
        recency: &RecencyIndex,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome, SearchError> {
        let parsed = self.parse(query);
        let facets = self.facets_for(&parsed, items);
        self.evaluate(&parsed, items, &facets, recency, cancel)
    }

    /// Rank a catalog from [`SearchEngine::prepare`], giving up early once `cancel` fires
    pub fn search_prepared(
        &self,
        query: &str,
        catalog: &PreparedCatalog,
        recency: &RecencyIndex,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome, SearchError> {
        if catalog.fold_diacritics() != self.config.normalize_diacritics {
            return Err(SearchError::CatalogMismatch);
        }
        let parsed = self.parse(query);
        self.evaluate(&parsed, catalog.items(), catalog.facets(), recency, cancel)
    }

    /// An empty query never looks at facets
    fn facets_for(&self, parsed: &ParsedQuery, items: &[CandidateItem]) -> Vec<NormalizedFacets> {
        if parsed.is_empty() {
            Vec::new()
        } else {
            normalize_all(items, self.config.normalize_diacritics)
        }
    }

    fn evaluate<I: Interrupt>(
        &self,
        parsed: &ParsedQuery,
        items: &[CandidateItem],
        facets: &[NormalizedFacets],
        recency: &RecencyIndex,
        interrupt: &I,
    ) -> Result<SearchOutcome, I::Error> {
        let started = Instant::now();

        let (eligible, priorities) = if parsed.is_empty() {
            let all: Vec<Stamped<'_>> = items
                .iter()
                .map(|item| Stamped {
                    item,
                    match_results: Vec::new(),
                })
                .collect();
            (all, self.empty_query_priorities.as_slice())
        } else {
            let stamped = self.stamp_all(parsed, items, facets, interrupt)?;
            (retain_eligible(stamped), self.config.sort_priorities.as_slice())
        };

        if let Err(err) = interrupt.check() {
            trace!(query = %parsed.original, "search cancelled before ranking");
            return Err(err);
        }

        let ranked = rank(eligible, priorities, recency);
        let outcome = truncate(ranked, self.config.max_results);

        debug!(
            query = %parsed.original,
            tokens = parsed.tokens.len(),
            candidates = items.len(),
            total = outcome.total,
            shown = outcome.shown,
            elapsed_us = started.elapsed().as_micros() as u64,
            "search evaluated"
        );

        Ok(outcome)
    }

    /// Stamp every item, in input order. Large lists are sharded across the
    /// rayon pool with one fuzzy matcher per worker.
    fn stamp_all<'a, I: Interrupt>(
        &self,
        parsed: &ParsedQuery,
        items: &'a [CandidateItem],
        facets: &[NormalizedFacets],
        interrupt: &I,
    ) -> Result<Vec<Stamped<'a>>, I::Error> {
        debug_assert_eq!(items.len(), facets.len());
        let tokens = parsed.tokens.as_slice();

        let stamped: Result<Vec<Stamped<'a>>, I::Error> = if items.len() < PARALLEL_THRESHOLD {
            let mut fuzzy = FuzzyMatcher::new();
            let mut results = Vec::with_capacity(items.len());
            for (item, item_facets) in items.iter().zip(facets) {
                interrupt.check()?;
                let mut ctx = MatchContext::new(&self.config, &mut fuzzy);
                results.push(self.aggregator.stamp(item, item_facets, tokens, &mut ctx));
            }
            Ok(results)
        } else {
            items
                .par_iter()
                .zip(facets.par_iter())
                .map_init(FuzzyMatcher::new, |fuzzy, (item, item_facets)| {
                    interrupt.check().map(|()| {
                        let mut ctx = MatchContext::new(&self.config, fuzzy);
                        self.aggregator.stamp(item, item_facets, tokens, &mut ctx)
                    })
                })
                .collect()
        };

        if stamped.is_err() {
            trace!(query = %parsed.original, "search cancelled during matching");
        }
        stamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::item::{MatchKind, MatchScore};

    fn note(name: &str) -> CandidateItem {
        CandidateItem::new(format!("{name}.md"), name)
    }

    fn engine(config: SearchConfig) -> SearchEngine {
        SearchEngine::new(config).unwrap()
    }

    fn names(outcome: &SearchOutcome) -> Vec<&str> {
        outcome.suggestions.iter().map(|s| s.item.name.as_str()).collect()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SearchConfig::default();
        config.max_results = 0;
        assert!(matches!(
            SearchEngine::new(config),
            Err(ConfigError::ZeroMaxResults)
        ));
    }

    #[test]
    fn test_search_basic() {
        let engine = engine(SearchConfig::default());
        let items = vec![note("Hello world"), note("Goodbye world"), note("Hello there")];

        let outcome = engine.search("hello", &items, &RecencyIndex::default());
        assert_eq!(outcome.total, 2);
        assert!(names(&outcome).iter().all(|n| n.contains("Hello")));
    }

    #[test]
    fn test_and_across_tokens() {
        let engine = engine(SearchConfig::default());
        let items = vec![note("Project Plan"), note("Project Budget")];

        let outcome = engine.search("proj plan", &items, &RecencyIndex::default());
        assert_eq!(names(&outcome), vec!["Project Plan"]);
        assert_eq!(outcome.suggestions[0].match_results.len(), 2);
    }

    #[test]
    fn test_no_match_is_empty_outcome() {
        let engine = engine(SearchConfig::default());
        let items = vec![note("Hello world")];

        let outcome = engine.search("xyz", &items, &RecencyIndex::default());
        assert_eq!(outcome, SearchOutcome::default());
    }

    #[test]
    fn test_empty_item_list() {
        let engine = engine(SearchConfig::default());
        let outcome = engine.search("anything", &[], &RecencyIndex::default());
        assert_eq!(outcome.total, 0);
        assert_eq!(outcome.shown, 0);
    }

    #[test]
    fn test_empty_query_keeps_all_and_skips_matching() {
        let config = SearchConfig::default()
            .with_priorities(&["exact-match", "starred"])
            .unwrap();
        let engine = engine(config);
        let mut a = note("A");
        a.starred = true;
        let b = note("B");
        let items = vec![b, a];

        let outcome = engine.search("", &items, &RecencyIndex::default());
        assert_eq!(names(&outcome), vec!["A", "B"]);
        assert!(outcome
            .suggestions
            .iter()
            .all(|s| s.match_results.is_empty()));
    }

    #[test]
    fn test_exact_match_first_beats_fuzzy() {
        let mut config = SearchConfig::default()
            .with_priorities(&["exact-match", "fuzzy-score", "alphabetical"])
            .unwrap();
        config.allow_fuzzy = true;
        config.min_fuzzy_score = 0.0;
        let engine = engine(config);
        // "abc" is a subsequence of both; only "xabcx" contains it literally
        let items = vec![note("aXbXc"), note("xabcx")];

        let outcome = engine.search("abc", &items, &RecencyIndex::default());
        assert_eq!(names(&outcome), vec!["xabcx", "aXbXc"]);
        assert!(outcome.suggestions[0].match_results[0].is_exact());
        assert!(matches!(
            outcome.suggestions[1].match_results[0].score,
            Some(MatchScore::Fuzzy(_))
        ));
    }

    #[test]
    fn test_recency_breaks_ties() {
        let config = SearchConfig::default()
            .with_priorities(&["exact-match", "last-opened"])
            .unwrap();
        let engine = engine(config);
        let items = vec![note("A plan"), note("B plan")];
        let recency: RecencyIndex = [("A plan.md".to_string(), 5), ("B plan.md".to_string(), 1)]
            .into_iter()
            .collect();

        let outcome = engine.search("plan", &items, &recency);
        assert_eq!(names(&outcome), vec!["B plan", "A plan"]);
    }

    #[test]
    fn test_truncation_and_counts() {
        let mut config = SearchConfig::default();
        config.max_results = 3;
        let engine = engine(config);
        let items: Vec<CandidateItem> = (0..10).map(|i| note(&format!("note {i}"))).collect();

        let outcome = engine.search("note", &items, &RecencyIndex::default());
        assert_eq!(outcome.total, 10);
        assert_eq!(outcome.shown, 3);
        let orders: Vec<usize> = outcome.suggestions.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_phantom_items_are_candidates() {
        let engine = engine(SearchConfig::default());
        let mut ghost = note("Future idea");
        ghost.phantom = true;

        let outcome = engine.search("idea", &[ghost], &RecencyIndex::default());
        assert_eq!(outcome.total, 1);
        assert!(outcome.suggestions[0].item.phantom);
    }

    #[test]
    fn test_header_meta_exposed_for_jump() {
        let mut config = SearchConfig::default();
        config.facets.header = true;
        let engine = engine(config);
        let mut item = note("Design");
        item.headers = vec!["Overview".to_string(), "Risks and mitigations".to_string()];

        let outcome = engine.search("risks", &[item], &RecencyIndex::default());
        let suggestion = &outcome.suggestions[0];
        assert_eq!(suggestion.match_results[0].kind, MatchKind::Header);
        assert_eq!(suggestion.matched_headers(), vec!["Risks and mitigations"]);
    }

    #[test]
    fn test_repeated_search_is_identical() {
        let mut config = SearchConfig::default();
        config.allow_fuzzy = true;
        config.min_fuzzy_score = 0.2;
        let engine = engine(config);
        let items: Vec<CandidateItem> = ["Daily 2024-01-01", "Daily 2024-01-02", "Dashboard", "Data"]
            .into_iter()
            .map(note)
            .collect();
        let recency = RecencyIndex::from_recent(["Data.md", "Dashboard.md"]);

        let first = engine.search("da", &items, &recency);
        let second = engine.search("da", &items, &recency);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parallel_path_matches_sequential_order() {
        let engine = engine(SearchConfig::default());
        let items: Vec<CandidateItem> = (0..PARALLEL_THRESHOLD + 100)
            .map(|i| note(&format!("item {i:05}")))
            .collect();
        let small = &items[..10];

        let big = engine.search("item", &items, &RecencyIndex::default());
        assert_eq!(big.total, items.len());
        let small_outcome = engine.search("item", small, &RecencyIndex::default());
        assert_eq!(small_outcome.total, 10);
        // Same names, same rules: ties resolve alphabetically in both
        assert_eq!(big.suggestions[0].item.name, "item 00000");
        assert_eq!(small_outcome.suggestions[0].item.name, "item 00000");
    }

    #[test]
    fn test_prepared_catalog_matches_one_shot_search() {
        let mut config = SearchConfig::default();
        config.allow_fuzzy = true;
        let engine = engine(config);
        let items = vec![note("Café plans"), note("Weekly Review"), note("Cafeteria")];
        let catalog = engine.prepare(items.clone());
        let recency = RecencyIndex::default();

        for query in ["cafe", "wkrv", "", "zzz"] {
            let prepared = engine
                .search_prepared(query, &catalog, &recency, &CancellationToken::new())
                .unwrap();
            assert_eq!(prepared, engine.search(query, &items, &recency));
        }
    }

    #[test]
    fn test_prepared_catalog_must_share_fold_setting() {
        let engine = engine(SearchConfig::default());
        let catalog = PreparedCatalog::new(vec![note("Café")], false);

        let result = engine.search_prepared(
            "cafe",
            &catalog,
            &RecencyIndex::default(),
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(SearchError::CatalogMismatch)));
    }

    #[test]
    fn test_cancelled_search_reports_cancellation() {
        let engine = engine(SearchConfig::default());
        let items = vec![note("alpha")];
        let token = CancellationToken::new();
        token.cancel();

        let result = engine.search_cancellable("alpha", &items, &RecencyIndex::default(), &token);
        assert!(matches!(result, Err(SearchError::Cancelled)));

        let catalog = engine.prepare(items);
        let result = engine.search_prepared("", &catalog, &RecencyIndex::default(), &token);
        assert!(matches!(result, Err(SearchError::Cancelled)));
    }
}
