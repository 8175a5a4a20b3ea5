//! Highlight spans for display
//!
//! Finds where query tokens occur in a displayed value so the UI can
//! emphasize them. Matching runs on the same normalized form the engine
//! compares with, and spans are mapped back to byte ranges of the original
//! text. Tokens are escaped before being compiled, so characters like `.`
//! or `(` in user input are always literal.

use regex::Regex;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

use super::parser::{normalize, Token};

/// Normalized text with, for each of its bytes, the byte range of the source
/// grapheme cluster it came from
struct FoldedText {
    text: String,
    origin: Vec<Range<usize>>,
}

impl FoldedText {
    /// Normalizes one grapheme cluster at a time, so NFC still composes a
    /// base char with its marks and every span ends on a cluster boundary.
    fn new(source: &str, fold_diacritics: bool) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut origin: Vec<Range<usize>> = Vec::with_capacity(source.len());
        let mut previous_start = 0;

        for (offset, cluster) in source.grapheme_indices(true) {
            let end = offset + cluster.len();
            let folded = normalize(cluster, fold_diacritics);

            if folded.is_empty() {
                // A cluster of dropped marks belongs to the one before it
                for range in &mut origin[previous_start..] {
                    range.end = end;
                }
                continue;
            }

            previous_start = origin.len();
            text.push_str(&folded);
            origin.extend(std::iter::repeat(offset..end).take(folded.len()));
        }

        Self { text, origin }
    }

    fn source_range(&self, folded: Range<usize>) -> Range<usize> {
        self.origin[folded.start].start..self.origin[folded.end - 1].end
    }
}

/// Merged, sorted byte ranges of `text` matched by any token.
///
/// `fold_diacritics` must be the setting the tokens were parsed with.
pub fn highlight_ranges(text: &str, tokens: &[Token], fold_diacritics: bool) -> Vec<Range<usize>> {
    if text.is_empty() || tokens.is_empty() {
        return Vec::new();
    }

    let folded = FoldedText::new(text, fold_diacritics);
    let mut ranges: Vec<Range<usize>> = Vec::new();

    for token in tokens {
        if token.normalized.is_empty() {
            continue;
        }
        let Ok(pattern) = Regex::new(&regex::escape(&token.normalized)) else {
            continue;
        };
        ranges.extend(
            pattern
                .find_iter(&folded.text)
                .map(|m| folded.source_range(m.range())),
        );
    }

    merge(ranges)
}

fn merge(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_by_key(|r| (r.start, r.end));
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Wrap each range of `text` in `**` for markdown output
pub fn emphasize(text: &str, ranges: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len() + ranges.len() * 4);
    let mut last = 0;
    for range in ranges {
        out.push_str(&text[last..range.start]);
        out.push_str("**");
        out.push_str(&text[range.clone()]);
        out.push_str("**");
        last = range.end;
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::parser::QueryParser;

    fn tokens(query: &str) -> Vec<Token> {
        QueryParser::parse(query, true).tokens
    }

    #[test]
    fn test_case_insensitive_ranges() {
        let ranges = highlight_ranges("Project Plan", &tokens("plan"), true);
        assert_eq!(ranges, vec![8..12]);
    }

    #[test]
    fn test_multiple_tokens_merge() {
        let text = "Weekly Review";
        let ranges = highlight_ranges(text, &tokens("week ly rev"), true);
        assert_eq!(ranges, vec![0..6, 7..10]);
        assert_eq!(emphasize(text, &ranges), "**Weekly** **Rev**iew");
    }

    #[test]
    fn test_overlapping_tokens() {
        let ranges = highlight_ranges("project", &tokens("pro project"), true);
        assert_eq!(ranges, vec![0..7]);
    }

    #[test]
    fn test_meta_characters_are_literal() {
        let text = "C++ (draft) a.b";
        assert_eq!(highlight_ranges(text, &tokens("c++"), true), vec![0..3]);
        assert_eq!(highlight_ranges(text, &tokens("(draft)"), true), vec![4..11]);
        assert_eq!(highlight_ranges(text, &tokens("a.b"), true), vec![12..15]);
        assert!(highlight_ranges("axb", &tokens("a.b"), true).is_empty());
        assert!(highlight_ranges("anything", &tokens(".*"), true).is_empty());
    }

    #[test]
    fn test_folded_ranges_map_to_original_bytes() {
        let text = "Café Crème";
        let ranges = highlight_ranges(text, &tokens("cafe creme"), true);
        assert_eq!(emphasize(text, &ranges), "**Café** **Crème**");
    }

    #[test]
    fn test_decomposed_accent_stays_inside_span() {
        let text = "cafe\u{301} time";
        let ranges = highlight_ranges(text, &tokens("cafe"), true);
        assert_eq!(ranges, vec![0..6]);
    }

    #[test]
    fn test_no_fold_requires_accent() {
        let text = "Café";
        let unfolded = QueryParser::parse("cafe", false).tokens;
        assert!(highlight_ranges(text, &unfolded, false).is_empty());
    }

    #[test]
    fn test_no_fold_composes_decomposed_text() {
        let text = "cafe\u{301} notes";
        let precomposed = QueryParser::parse("café", false).tokens;
        assert_eq!(highlight_ranges(text, &precomposed, false), vec![0..6]);
        assert_eq!(emphasize(text, &[0..6]), "**cafe\u{301}** notes");

        let decomposed = QueryParser::parse("cafe\u{301}", false).tokens;
        assert_eq!(highlight_ranges("Café", &decomposed, false), vec![0..5]);
    }

    #[test]
    fn test_no_fold_agrees_with_engine_verdict() {
        use crate::config::SearchConfig;
        use crate::search::{CandidateItem, MatchKind, RecencyIndex, SearchEngine};

        let mut config = SearchConfig::default();
        config.normalize_diacritics = false;
        let engine = SearchEngine::new(config).unwrap();
        let items = vec![CandidateItem::new("cafe.md", "cafe\u{301} notes")];

        let outcome = engine.search("café", &items, &RecencyIndex::default());
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.suggestions[0].match_results[0].kind, MatchKind::Name);

        let tokens = engine.parse("café").tokens;
        let label = outcome.suggestions[0].display_label();
        assert!(!highlight_ranges(label, &tokens, false).is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(highlight_ranges("", &tokens("a"), true).is_empty());
        assert!(highlight_ranges("abc", &[], true).is_empty());
        assert_eq!(emphasize("abc", &[]), "abc");
    }
}
