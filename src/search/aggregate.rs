//! Match aggregation: one verdict per (item, token), then the AND filter

use super::fuzzy::FuzzyMatcher;
use super::item::{CandidateItem, MatchResult};
use super::matchers::{default_matchers, FacetMatcher, MatchContext};
use super::parser::Token;
use super::prepared::NormalizedFacets;
use crate::config::SearchConfig;

/// An item paired with the verdicts for the current query
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<'a> {
    pub item: &'a CandidateItem,
    /// One entry per query token, in token order
    pub match_results: Vec<MatchResult>,
}

impl Stamped<'_> {
    /// Every token found a facet. Vacuously true for an empty query.
    pub fn is_eligible(&self) -> bool {
        self.match_results.iter().all(MatchResult::is_found)
    }
}

/// Runs the facet matchers in precedence order for each token
pub struct Aggregator {
    matchers: Vec<Box<dyn FacetMatcher>>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            matchers: default_matchers(),
        }
    }

    /// Verdict for one token: the first facet that matches, else `NotFound`
    pub fn match_token(
        &self,
        item: &CandidateItem,
        facets: &NormalizedFacets,
        token: &Token,
        ctx: &mut MatchContext<'_>,
    ) -> MatchResult {
        self.matchers
            .iter()
            .find_map(|matcher| matcher.try_match(item, facets, token, ctx))
            .unwrap_or_else(MatchResult::not_found)
    }

    /// Populate the verdicts of `item` for `tokens`. Pure: the same inputs
    /// always produce the same verdicts.
    ///
    /// `facets` must be `item` normalized with the context's diacritic setting.
    pub fn stamp<'a>(
        &self,
        item: &'a CandidateItem,
        facets: &NormalizedFacets,
        tokens: &[Token],
        ctx: &mut MatchContext<'_>,
    ) -> Stamped<'a> {
        let match_results = tokens
            .iter()
            .map(|token| self.match_token(item, facets, token, ctx))
            .collect();

        Stamped {
            item,
            match_results,
        }
    }
}

/// Convenience form of [`Aggregator::stamp`] that normalizes `item` itself
/// and uses a throwaway fuzzy matcher
pub fn stamp_match_results<'a>(
    item: &'a CandidateItem,
    tokens: &[Token],
    config: &SearchConfig,
) -> Stamped<'a> {
    let facets = NormalizedFacets::new(item, config.normalize_diacritics);
    let mut fuzzy = FuzzyMatcher::new();
    let mut ctx = MatchContext::new(config, &mut fuzzy);
    Aggregator::new().stamp(item, &facets, tokens, &mut ctx)
}

/// Keep items every token matched, preserving input order
pub fn retain_eligible(stamped: Vec<Stamped<'_>>) -> Vec<Stamped<'_>> {
    stamped.into_iter().filter(Stamped::is_eligible).collect()
}
