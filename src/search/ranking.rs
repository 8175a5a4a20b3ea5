//! Ranking: ordered priority rules with a stable fallback
//!
//! Each [`PriorityRule`] compares two eligible items; the first rule that
//! tells them apart decides. Items every rule ties on keep their input order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::aggregate::Stamped;
use super::item::{ExactKind, MatchKind, MatchResult, MatchScore, SearchOutcome, Suggestion};
use super::parser::normalize;
use crate::error::ConfigError;

/// One criterion of the ranking chain. Settings spell them in kebab-case;
/// `#name` ranks items carrying that tag first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PriorityRule {
    /// More exact name/alias hits, then more exact hits on any facet
    ExactMatch,
    /// More tokens equal to a whole word
    PerfectWordMatch,
    /// More name/alias hits at the start of the value
    PrefixNameMatch,
    /// More tokens found in the name or an alias
    NameMatch,
    /// Higher summed match score, compared kind by kind in facet precedence order
    FuzzyScore,
    TagMatch,
    HeaderMatch,
    LinkMatch,
    /// Shorter name first
    Length,
    /// Smaller recency rank first; never-opened items last
    LastOpened,
    LastModified,
    CreatedLatest,
    CreatedEarliest,
    Starred,
    Alphabetical,
    AlphabeticalReverse,
    /// Existing notes before phantom ones
    NotPhantom,
    Tag(String),
}

impl PriorityRule {
    /// Rules that only judge match quality and mean nothing without a query
    pub fn is_match_quality(&self) -> bool {
        matches!(
            self,
            PriorityRule::ExactMatch
                | PriorityRule::PerfectWordMatch
                | PriorityRule::PrefixNameMatch
                | PriorityRule::NameMatch
                | PriorityRule::FuzzyScore
                | PriorityRule::TagMatch
                | PriorityRule::HeaderMatch
                | PriorityRule::LinkMatch
        )
    }

    fn compare(&self, a: &RankFacts<'_>, b: &RankFacts<'_>) -> Ordering {
        match self {
            PriorityRule::ExactMatch => (b.exact_identity, b.exact_total)
                .cmp(&(a.exact_identity, a.exact_total)),
            PriorityRule::PerfectWordMatch => b.perfect_words.cmp(&a.perfect_words),
            PriorityRule::PrefixNameMatch => b.name_prefixes.cmp(&a.name_prefixes),
            PriorityRule::NameMatch => b.identity_hits.cmp(&a.identity_hits),
            PriorityRule::FuzzyScore => b
                .kind_scores
                .iter()
                .zip(&a.kind_scores)
                .map(|(theirs, ours)| theirs.total_cmp(ours))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal),
            PriorityRule::TagMatch => b.tag_hits.cmp(&a.tag_hits),
            PriorityRule::HeaderMatch => b.header_hits.cmp(&a.header_hits),
            PriorityRule::LinkMatch => b.link_hits.cmp(&a.link_hits),
            PriorityRule::Length => a.name_len.cmp(&b.name_len),
            PriorityRule::LastOpened => a.recency.cmp(&b.recency),
            PriorityRule::LastModified => b.stamped.item.modified_at.cmp(&a.stamped.item.modified_at),
            PriorityRule::CreatedLatest => b.stamped.item.created_at.cmp(&a.stamped.item.created_at),
            PriorityRule::CreatedEarliest => {
                earliest_first(a.stamped.item.created_at, b.stamped.item.created_at)
            }
            PriorityRule::Starred => b.stamped.item.starred.cmp(&a.stamped.item.starred),
            PriorityRule::Alphabetical => a.sort_name.cmp(&b.sort_name),
            PriorityRule::AlphabeticalReverse => b.sort_name.cmp(&a.sort_name),
            PriorityRule::NotPhantom => a.stamped.item.phantom.cmp(&b.stamped.item.phantom),
            PriorityRule::Tag(tag) => b
                .stamped
                .item
                .has_tag(tag)
                .cmp(&a.stamped.item.has_tag(tag)),
        }
    }
}

/// Ascending, with missing timestamps last
fn earliest_first(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl FromStr for PriorityRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(tag) = s.strip_prefix('#') {
            if tag.is_empty() {
                return Err(ConfigError::EmptyTagRule);
            }
            return Ok(PriorityRule::Tag(s.to_string()));
        }

        let rule = match s {
            "exact-match" => PriorityRule::ExactMatch,
            "perfect-word-match" => PriorityRule::PerfectWordMatch,
            "prefix-name-match" => PriorityRule::PrefixNameMatch,
            "name-match" => PriorityRule::NameMatch,
            "fuzzy-score" => PriorityRule::FuzzyScore,
            "tag-match" => PriorityRule::TagMatch,
            "header-match" => PriorityRule::HeaderMatch,
            "link-match" => PriorityRule::LinkMatch,
            "length" => PriorityRule::Length,
            "last-opened" => PriorityRule::LastOpened,
            "last-modified" => PriorityRule::LastModified,
            "created-latest" => PriorityRule::CreatedLatest,
            "created-earliest" => PriorityRule::CreatedEarliest,
            "starred" => PriorityRule::Starred,
            "alphabetical" => PriorityRule::Alphabetical,
            "alphabetical-reverse" => PriorityRule::AlphabeticalReverse,
            "not-phantom" => PriorityRule::NotPhantom,
            other => return Err(ConfigError::UnknownPriorityRule(other.to_string())),
        };
        Ok(rule)
    }
}

impl TryFrom<String> for PriorityRule {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PriorityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriorityRule::ExactMatch => "exact-match",
            PriorityRule::PerfectWordMatch => "perfect-word-match",
            PriorityRule::PrefixNameMatch => "prefix-name-match",
            PriorityRule::NameMatch => "name-match",
            PriorityRule::FuzzyScore => "fuzzy-score",
            PriorityRule::TagMatch => "tag-match",
            PriorityRule::HeaderMatch => "header-match",
            PriorityRule::LinkMatch => "link-match",
            PriorityRule::Length => "length",
            PriorityRule::LastOpened => "last-opened",
            PriorityRule::LastModified => "last-modified",
            PriorityRule::CreatedLatest => "created-latest",
            PriorityRule::CreatedEarliest => "created-earliest",
            PriorityRule::Starred => "starred",
            PriorityRule::Alphabetical => "alphabetical",
            PriorityRule::AlphabeticalReverse => "alphabetical-reverse",
            PriorityRule::NotPhantom => "not-phantom",
            PriorityRule::Tag(tag) => tag,
        };
        f.write_str(name)
    }
}

impl From<PriorityRule> for String {
    fn from(rule: PriorityRule) -> Self {
        rule.to_string()
    }
}

pub fn default_priorities() -> Vec<PriorityRule> {
    vec![
        PriorityRule::ExactMatch,
        PriorityRule::PerfectWordMatch,
        PriorityRule::PrefixNameMatch,
        PriorityRule::NameMatch,
        PriorityRule::FuzzyScore,
        PriorityRule::Starred,
        PriorityRule::LastOpened,
        PriorityRule::Length,
        PriorityRule::Alphabetical,
    ]
}

/// Rule list used when the query is empty: match-quality rules dropped
pub fn empty_query_priorities(priorities: &[PriorityRule]) -> Vec<PriorityRule> {
    priorities
        .iter()
        .filter(|rule| !rule.is_match_quality())
        .cloned()
        .collect()
}

/// Most-recently-used ranking of paths, 0 = most recent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecencyIndex {
    ranks: HashMap<String, usize>,
}

impl RecencyIndex {
    /// Build from paths ordered most recent first; repeats keep their first rank
    pub fn from_recent<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ranks = HashMap::new();
        for (rank, path) in paths.into_iter().enumerate() {
            ranks.entry(path.into()).or_insert(rank);
        }
        Self { ranks }
    }

    pub fn rank(&self, path: &str) -> Option<usize> {
        self.ranks.get(path).copied()
    }

    /// Rank used for sorting: never-opened paths (phantoms included) sort last
    pub fn sort_rank(&self, path: &str) -> usize {
        self.rank(path).unwrap_or(usize::MAX)
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

impl FromIterator<(String, usize)> for RecencyIndex {
    fn from_iter<T: IntoIterator<Item = (String, usize)>>(iter: T) -> Self {
        Self {
            ranks: iter.into_iter().collect(),
        }
    }
}

/// Everything the rules look at, computed once per item before sorting
struct RankFacts<'a> {
    stamped: Stamped<'a>,
    exact_identity: usize,
    exact_total: usize,
    perfect_words: usize,
    name_prefixes: usize,
    identity_hits: usize,
    /// Summed scores per match kind, in facet precedence order
    kind_scores: [f32; KIND_SLOTS],
    tag_hits: usize,
    header_hits: usize,
    link_hits: usize,
    name_len: usize,
    recency: usize,
    sort_name: String,
}

impl<'a> RankFacts<'a> {
    fn new(stamped: Stamped<'a>, recency: &RecencyIndex) -> Self {
        let results = stamped.match_results.as_slice();

        let exact_identity = count(results, |r| r.is_identity() && r.is_exact());
        let exact_total = count(results, MatchResult::is_exact);
        let perfect_words = count(results, |r| {
            r.score == Some(MatchScore::Exact(ExactKind::Word))
        });
        let name_prefixes = count(results, |r| {
            r.is_identity()
                && matches!(r.score, Some(MatchScore::Exact(k)) if k >= ExactKind::Prefix)
        });
        let identity_hits = count(results, MatchResult::is_identity);
        let tag_hits = count(results, |r| r.kind == MatchKind::Tag);
        let header_hits = count(results, |r| r.kind == MatchKind::Header);
        let link_hits = count(results, |r| r.kind == MatchKind::Link);
        let mut kind_scores = [0.0; KIND_SLOTS];
        for result in results {
            if let (Some(slot), Some(score)) = (kind_slot(result.kind), result.score) {
                kind_scores[slot] += score.value();
            }
        }

        let item = stamped.item;
        Self {
            exact_identity,
            exact_total,
            perfect_words,
            name_prefixes,
            identity_hits,
            kind_scores,
            tag_hits,
            header_hits,
            link_hits,
            name_len: item.name.chars().count(),
            recency: recency.sort_rank(&item.path),
            sort_name: normalize(&item.name, true),
            stamped,
        }
    }
}

const KIND_SLOTS: usize = 5;

fn kind_slot(kind: MatchKind) -> Option<usize> {
    match kind {
        MatchKind::Name => Some(0),
        MatchKind::Alias => Some(1),
        MatchKind::Tag => Some(2),
        MatchKind::Header => Some(3),
        MatchKind::Link => Some(4),
        MatchKind::NotFound => None,
    }
}

fn count(results: &[MatchResult], pred: impl Fn(&MatchResult) -> bool) -> usize {
    results.iter().filter(|r| pred(r)).count()
}

/// Stable sort of eligible items by `priorities`
pub fn rank<'a>(
    items: Vec<Stamped<'a>>,
    priorities: &[PriorityRule],
    recency: &RecencyIndex,
) -> Vec<Stamped<'a>> {
    let mut facts: Vec<RankFacts<'a>> = items
        .into_iter()
        .map(|stamped| RankFacts::new(stamped, recency))
        .collect();

    facts.sort_by(|a, b| {
        priorities
            .iter()
            .map(|rule| rule.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    facts.into_iter().map(|f| f.stamped).collect()
}

/// Cut the ranked list to `max_results` and number the survivors
pub fn truncate(ranked: Vec<Stamped<'_>>, max_results: usize) -> SearchOutcome {
    let total = ranked.len();
    let suggestions: Vec<Suggestion> = ranked
        .into_iter()
        .take(max_results)
        .enumerate()
        .map(|(order, stamped)| Suggestion {
            item: stamped.item.clone(),
            match_results: stamped.match_results,
            order,
        })
        .collect();

    SearchOutcome {
        shown: suggestions.len(),
        suggestions,
        total,
    }
}
