//! Candidate items and per-token match verdicts

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One note, or one not-yet-created ("phantom") note, as extracted by the
/// vault indexer. Immutable for the lifetime of a search session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateItem {
    /// Vault-relative path, unique per item
    pub path: String,
    /// Basename without extension
    pub name: String,
    pub phantom: bool,
    pub starred: bool,
    pub name_tokens: Vec<String>,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub headers: Vec<String>,
    pub links: Vec<String>,
    pub front_matter: Option<serde_json::Map<String, serde_json::Value>>,
    /// Epoch millis
    pub modified_at: Option<i64>,
    /// Epoch millis
    pub created_at: Option<i64>,
}

impl CandidateItem {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Tag membership ignoring a leading `#` and ASCII case
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim_start_matches('#');
        self.tags
            .iter()
            .any(|t| t.trim_start_matches('#').eq_ignore_ascii_case(wanted))
    }
}

/// Searchable attribute of an item, in match precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    Name,
    Alias,
    Tag,
    Header,
    Link,
}

/// Which facet produced a token's match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    Name,
    Alias,
    Tag,
    Header,
    Link,
    NotFound,
}

impl From<FacetKind> for MatchKind {
    fn from(kind: FacetKind) -> Self {
        match kind {
            FacetKind::Name => MatchKind::Name,
            FacetKind::Alias => MatchKind::Alias,
            FacetKind::Tag => MatchKind::Tag,
            FacetKind::Header => MatchKind::Header,
            FacetKind::Link => MatchKind::Link,
        }
    }
}

/// Where a literal hit sits inside the facet value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExactKind {
    Substring,
    /// Value starts with the token
    Prefix,
    /// Token equals one whole word of the value
    Word,
}

/// Quality of a match. Exact always outranks fuzzy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchScore {
    Exact(ExactKind),
    /// Normalized similarity in `0.0..=1.0`
    Fuzzy(f32),
}

impl MatchScore {
    pub fn is_exact(&self) -> bool {
        matches!(self, MatchScore::Exact(_))
    }

    /// Numeric view used when summing scores; exact hits count as 1.0
    pub fn value(&self) -> f32 {
        match self {
            MatchScore::Exact(_) => 1.0,
            MatchScore::Fuzzy(score) => *score,
        }
    }

    pub fn cmp_quality(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MatchScore::Exact(a), MatchScore::Exact(b)) => a.cmp(b),
            (MatchScore::Exact(_), MatchScore::Fuzzy(_)) => Ordering::Greater,
            (MatchScore::Fuzzy(_), MatchScore::Exact(_)) => Ordering::Less,
            (MatchScore::Fuzzy(a), MatchScore::Fuzzy(b)) => a.total_cmp(b),
        }
    }
}

/// Verdict for one (item, token) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub kind: MatchKind,
    /// `None` only for `NotFound`
    pub score: Option<MatchScore>,
    /// Facet values that matched (tag, header text, link target, alias)
    pub meta: Vec<String>,
    pub is_alias: bool,
}

impl MatchResult {
    pub fn found(kind: FacetKind, score: MatchScore, meta: Vec<String>) -> Self {
        Self {
            kind: kind.into(),
            score: Some(score),
            meta,
            is_alias: kind == FacetKind::Alias,
        }
    }

    pub fn not_found() -> Self {
        Self {
            kind: MatchKind::NotFound,
            score: None,
            meta: Vec::new(),
            is_alias: false,
        }
    }

    pub fn is_found(&self) -> bool {
        self.kind != MatchKind::NotFound
    }

    pub fn is_exact(&self) -> bool {
        self.score.is_some_and(|s| s.is_exact())
    }

    /// Name or alias: the item's identity rather than its contents
    pub fn is_identity(&self) -> bool {
        matches!(self.kind, MatchKind::Name | MatchKind::Alias)
    }
}

/// One ranked entry handed back to the driving layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub item: CandidateItem,
    pub match_results: Vec<MatchResult>,
    /// 0-based display rank after truncation
    pub order: usize,
}

impl Suggestion {
    /// Header texts matched by any token, for jump-to-header offset lookup
    pub fn matched_headers(&self) -> Vec<&str> {
        self.match_results
            .iter()
            .filter(|r| r.kind == MatchKind::Header)
            .flat_map(|r| r.meta.iter().map(String::as_str))
            .collect()
    }

    /// The alias that matched when the item was found through one, else the name
    pub fn display_label(&self) -> &str {
        self.match_results
            .iter()
            .find(|r| r.is_alias)
            .and_then(|r| r.meta.first())
            .map(String::as_str)
            .unwrap_or(&self.item.name)
    }
}

/// Ranked, truncated output of one evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub suggestions: Vec<Suggestion>,
    /// Eligible items before truncation
    pub total: usize,
    pub shown: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_outranks_any_fuzzy() {
        let exact = MatchScore::Exact(ExactKind::Substring);
        let fuzzy = MatchScore::Fuzzy(1.0);
        assert_eq!(exact.cmp_quality(&fuzzy), Ordering::Greater);
        assert_eq!(fuzzy.cmp_quality(&exact), Ordering::Less);
    }

    #[test]
    fn test_exact_kind_order() {
        assert!(ExactKind::Word > ExactKind::Prefix);
        assert!(ExactKind::Prefix > ExactKind::Substring);
    }

    #[test]
    fn test_match_result_alias_flag() {
        let result = MatchResult::found(
            FacetKind::Alias,
            MatchScore::Exact(ExactKind::Word),
            vec!["PP".to_string()],
        );
        assert_eq!(result.kind, MatchKind::Alias);
        assert!(result.is_alias);
        assert!(result.is_identity());

        let missing = MatchResult::not_found();
        assert!(!missing.is_found());
        assert!(!missing.is_exact());
        assert!(missing.meta.is_empty());
    }

    #[test]
    fn test_item_deserializes_with_missing_facets() {
        let item: CandidateItem =
            serde_json::from_str(r#"{"path": "a/Plan.md", "name": "Plan", "starred": true}"#)
                .unwrap();
        assert_eq!(item.name, "Plan");
        assert!(item.starred);
        assert!(item.tags.is_empty());
        assert!(item.front_matter.is_none());
    }

    #[test]
    fn test_has_tag_ignores_hash_and_case() {
        let mut item = CandidateItem::new("p.md", "p");
        item.tags = vec!["#Work".to_string(), "#work/planning".to_string()];
        assert!(item.has_tag("#work"));
        assert!(item.has_tag("WORK"));
        assert!(item.has_tag("#work/planning"));
        assert!(!item.has_tag("#wor"));
        assert!(!item.has_tag("#planning"));
    }

    #[test]
    fn test_suggestion_helpers() {
        let suggestion = Suggestion {
            item: CandidateItem::new("Project Plan.md", "Project Plan"),
            match_results: vec![
                MatchResult::found(
                    FacetKind::Alias,
                    MatchScore::Exact(ExactKind::Prefix),
                    vec!["Roadmap".to_string()],
                ),
                MatchResult::found(
                    FacetKind::Header,
                    MatchScore::Exact(ExactKind::Substring),
                    vec!["Milestones".to_string()],
                ),
            ],
            order: 0,
        };
        assert_eq!(suggestion.display_label(), "Roadmap");
        assert_eq!(suggestion.matched_headers(), vec!["Milestones"]);
    }
}
