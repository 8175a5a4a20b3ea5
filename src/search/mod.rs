//! Matching and ranking engine
//!
//! Turns a raw query plus pre-extracted candidate notes into a ranked,
//! truncated suggestion list: tokenize, match each token against the facets
//! in precedence order, drop items any token missed, then sort by the
//! configured priority rules.

pub mod aggregate;
pub mod engine;
pub mod fuzzy;
pub mod highlight;
pub mod item;
pub mod matchers;
pub mod parser;
pub mod prepared;
pub mod ranking;


pub use aggregate::{stamp_match_results, Stamped};
pub use engine::SearchEngine;
pub use fuzzy::FuzzyMatcher;
pub use item::{
    CandidateItem, ExactKind, FacetKind, MatchKind, MatchResult, MatchScore, SearchOutcome,
    Suggestion,
};
pub use parser::{normalize, tokenize, ParsedQuery, QueryParser, Token};
pub use prepared::{NormalizedFacets, PreparedCatalog};
pub use ranking::{rank, PriorityRule, RecencyIndex};
