//! Query Parser & Normalizer
//!
//! Splits a raw query into whitespace-delimited tokens and produces the
//! normalized form every facet comparison runs on.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// One whitespace-delimited unit of the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Text as typed, kept for display and highlighting
    pub original: String,
    /// Lower-cased (and optionally diacritic-folded) comparison form
    pub normalized: String,
}

impl Token {
    pub fn new(original: &str, fold_diacritics: bool) -> Self {
        Self {
            original: original.to_string(),
            normalized: normalize(original, fold_diacritics),
        }
    }
}

/// Parsed query ready for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Original unmodified query
    pub original: String,
    pub tokens: Vec<Token>,
}

impl ParsedQuery {
    /// True when nothing but whitespace was typed
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Query parser
pub struct QueryParser;

impl QueryParser {
    pub fn parse(query: &str, fold_diacritics: bool) -> ParsedQuery {
        let tokens = tokenize(query)
            .into_iter()
            .map(|t| Token::new(t, fold_diacritics))
            .filter(|t| !t.normalized.is_empty())
            .collect();

        ParsedQuery {
            original: query.to_string(),
            tokens,
        }
    }
}

/// Split on runs of Unicode whitespace (ideographic space included),
/// dropping empty fragments and keeping order
pub fn tokenize(query: &str) -> Vec<&str> {
    query
        .split(char::is_whitespace)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

/// Lower-case `text` and, when `fold_diacritics` is set, strip combining
/// marks so accented and unaccented spellings compare equal.
///
/// Output is NFC so precomposed and decomposed input agree either way.
pub fn normalize(text: &str, fold_diacritics: bool) -> String {
    if text.is_ascii() {
        return text.to_ascii_lowercase();
    }

    let lowered = text.chars().flat_map(char::to_lowercase);
    if fold_diacritics {
        lowered
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .nfc()
            .collect()
    } else {
        lowered.nfc().collect()
    }
}
