//! Fuzzy Matching Engine using nucleo-matcher
//!
//! Implements fuzzy string matching with the Smith-Waterman algorithm
//! via the nucleo-matcher crate (used in Helix editor), plus literal
//! substring classification for exact hits.
//!
//! Both inputs are expected to be normalized already (see
//! [`super::parser::normalize`]); nucleo's own folding is switched off so the
//! diacritic setting is the only thing that decides whether "é" equals "e".

use nucleo_matcher::{Config, Matcher, Utf32Str};
use unicode_segmentation::UnicodeSegmentation;

use super::item::ExactKind;

/// Fuzzy matcher holding nucleo's scratch memory between calls
pub struct FuzzyMatcher {
    matcher: Matcher,
    haystack_buf: Vec<char>,
    needle_buf: Vec<char>,
    /// Self-alignment score of the most recent needle
    reference: Option<(String, u16)>,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyMatcher {
    pub fn new() -> Self {
        let mut config = Config::DEFAULT;
        config.ignore_case = false;
        config.normalize = false;

        Self {
            matcher: Matcher::new(config),
            haystack_buf: Vec::new(),
            needle_buf: Vec::new(),
            reference: None,
        }
    }

    /// Raw nucleo alignment score, `None` when `needle` is not a subsequence
    fn raw_score(&mut self, haystack: &str, needle: &str) -> Option<u16> {
        self.matcher.fuzzy_match(
            utf32(haystack, &mut self.haystack_buf),
            utf32(needle, &mut self.needle_buf),
        )
    }

    /// Best attainable score for `needle`: the needle aligned against itself
    fn reference_score(&mut self, needle: &str) -> Option<u16> {
        if let Some((cached, score)) = &self.reference {
            if cached == needle {
                return Some(*score);
            }
        }
        let score = self.raw_score(needle, needle)?;
        self.reference = Some((needle.to_string(), score));
        Some(score)
    }

    /// Similarity of `needle` within `haystack`, normalized to `0.0..=1.0`.
    ///
    /// Returns `None` if the needle's characters do not all appear in order.
    /// For a fixed needle the result is monotonic in nucleo's alignment score,
    /// which rewards prefix and word-boundary alignment and penalizes gaps.
    pub fn score(&mut self, haystack: &str, needle: &str) -> Option<f32> {
        if needle.is_empty() || haystack.is_empty() {
            return None;
        }

        let raw = self.raw_score(haystack, needle)?;
        let reference = self.reference_score(needle)?;
        if reference == 0 {
            return Some(0.0);
        }

        Some((f32::from(raw) / f32::from(reference)).clamp(0.0, 1.0))
    }
}

/// One code point per `char`. `Utf32Str::new` keeps only the first char of
/// each grapheme cluster, which would drop combining marks the normalizer kept.
fn utf32<'b>(text: &'b str, buf: &'b mut Vec<char>) -> Utf32Str<'b> {
    if text.is_ascii() {
        return Utf32Str::Ascii(text.as_bytes());
    }
    buf.clear();
    buf.extend(text.chars());
    Utf32Str::Unicode(buf)
}

/// Classify a literal hit of `needle` inside `haystack`.
///
/// `words` are the haystack's words; when empty, Unicode word boundaries of
/// the haystack are used instead. Returns `None` when `needle` is not a
/// contiguous substring.
pub fn classify_exact(haystack: &str, needle: &str, words: &[String]) -> Option<ExactKind> {
    if needle.is_empty() || !haystack.contains(needle) {
        return None;
    }

    let is_word = if words.is_empty() {
        haystack.unicode_words().any(|w| w == needle)
    } else {
        words.iter().any(|w| w == needle)
    };
    if is_word || haystack == needle {
        return Some(ExactKind::Word);
    }

    if haystack.starts_with(needle) {
        return Some(ExactKind::Prefix);
    }

    Some(ExactKind::Substring)
}
