//! Facet matchers
//!
//! Every searchable facet is a [`FacetMatcher`]. The aggregator walks them in
//! precedence order and keeps the first verdict, so the order of
//! [`default_matchers`] is the facet precedence: Name > Alias > Tag > Header > Link.

use super::fuzzy::{classify_exact, FuzzyMatcher};
use super::item::{CandidateItem, FacetKind, MatchResult, MatchScore};
use super::parser::Token;
use super::prepared::NormalizedFacets;
use crate::config::SearchConfig;

/// Per-evaluation state shared by all matchers
pub struct MatchContext<'a> {
    pub config: &'a SearchConfig,
    pub fuzzy: &'a mut FuzzyMatcher,
}

impl<'a> MatchContext<'a> {
    pub fn new(config: &'a SearchConfig, fuzzy: &'a mut FuzzyMatcher) -> Self {
        Self { config, fuzzy }
    }
}

pub trait FacetMatcher: Send + Sync {
    fn facet(&self) -> FacetKind;

    /// Raw facet values of `item`
    fn values<'i>(&self, item: &'i CandidateItem) -> &'i [String];

    /// The same values, normalized, in the same order
    fn normalized<'f>(&self, facets: &'f NormalizedFacets) -> &'f [String];

    /// Words used to recognize whole-word hits; empty means Unicode word boundaries
    fn words<'f>(&self, _facets: &'f NormalizedFacets) -> &'f [String] {
        &[]
    }

    /// Verdict for one token, `None` when the facet is disabled, empty, or misses.
    ///
    /// A literal hit on any value wins over fuzzy; every value containing the
    /// token is reported in `meta`. Otherwise the best fuzzy value at or above
    /// the configured threshold is reported.
    fn try_match(
        &self,
        item: &CandidateItem,
        facets: &NormalizedFacets,
        token: &Token,
        ctx: &mut MatchContext<'_>,
    ) -> Option<MatchResult> {
        let facet = self.facet();
        if !ctx.config.facets.is_enabled(facet) {
            return None;
        }
        let values = self.values(item);
        if values.is_empty() || token.normalized.is_empty() {
            return None;
        }

        let normalized = self.normalized(facets);
        let words = self.words(facets);

        let mut best_exact = None;
        let mut meta = Vec::new();
        for (value, norm) in values.iter().zip(normalized) {
            if let Some(kind) = classify_exact(norm, &token.normalized, words) {
                best_exact = best_exact.max(Some(kind));
                meta.push(value.clone());
            }
        }
        if let Some(kind) = best_exact {
            return Some(MatchResult::found(facet, MatchScore::Exact(kind), meta));
        }

        if !ctx.config.fuzzy_applies(facet) {
            return None;
        }

        let mut best: Option<(f32, &String)> = None;
        for (value, norm) in values.iter().zip(normalized) {
            let Some(score) = ctx.fuzzy.score(norm, &token.normalized) else {
                continue;
            };
            if score < ctx.config.min_fuzzy_score {
                continue;
            }
            if best.map_or(true, |(current, _)| score > current) {
                best = Some((score, value));
            }
        }

        best.map(|(score, value)| {
            MatchResult::found(facet, MatchScore::Fuzzy(score), vec![value.clone()])
        })
    }
}

pub struct NameMatcher;

impl FacetMatcher for NameMatcher {
    fn facet(&self) -> FacetKind {
        FacetKind::Name
    }

    fn values<'i>(&self, item: &'i CandidateItem) -> &'i [String] {
        std::slice::from_ref(&item.name)
    }

    fn normalized<'f>(&self, facets: &'f NormalizedFacets) -> &'f [String] {
        std::slice::from_ref(&facets.name)
    }

    fn words<'f>(&self, facets: &'f NormalizedFacets) -> &'f [String] {
        &facets.name_words
    }
}

pub struct AliasMatcher;

impl FacetMatcher for AliasMatcher {
    fn facet(&self) -> FacetKind {
        FacetKind::Alias
    }

    fn values<'i>(&self, item: &'i CandidateItem) -> &'i [String] {
        &item.aliases
    }

    fn normalized<'f>(&self, facets: &'f NormalizedFacets) -> &'f [String] {
        &facets.aliases
    }
}

pub struct TagMatcher;

impl FacetMatcher for TagMatcher {
    fn facet(&self) -> FacetKind {
        FacetKind::Tag
    }

    fn values<'i>(&self, item: &'i CandidateItem) -> &'i [String] {
        &item.tags
    }

    fn normalized<'f>(&self, facets: &'f NormalizedFacets) -> &'f [String] {
        &facets.tags
    }
}

pub struct HeaderMatcher;

impl FacetMatcher for HeaderMatcher {
    fn facet(&self) -> FacetKind {
        FacetKind::Header
    }

    fn values<'i>(&self, item: &'i CandidateItem) -> &'i [String] {
        &item.headers
    }

    fn normalized<'f>(&self, facets: &'f NormalizedFacets) -> &'f [String] {
        &facets.headers
    }
}

pub struct LinkMatcher;

impl FacetMatcher for LinkMatcher {
    fn facet(&self) -> FacetKind {
        FacetKind::Link
    }

    fn values<'i>(&self, item: &'i CandidateItem) -> &'i [String] {
        &item.links
    }

    fn normalized<'f>(&self, facets: &'f NormalizedFacets) -> &'f [String] {
        &facets.links
    }
}

/// All facet matchers, in precedence order
pub fn default_matchers() -> Vec<Box<dyn FacetMatcher>> {
    vec![
        Box::new(NameMatcher),
        Box::new(AliasMatcher),
        Box::new(TagMatcher),
        Box::new(HeaderMatcher),
        Box::new(LinkMatcher),
    ]
}
