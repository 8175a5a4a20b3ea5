//! Facet values normalized once per catalog
//!
//! Items do not change while a session is open, so their names, aliases,
//! tags, headers and links are normalized up front instead of once per
//! token on every keystroke.

use rayon::prelude::*;

use super::engine::PARALLEL_THRESHOLD;
use super::item::CandidateItem;
use super::parser::normalize;

/// Normalized facet values of one item, index-aligned with the raw values
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFacets {
    pub name: String,
    /// Normalized `name_tokens`; empty means Unicode word boundaries apply
    pub name_words: Vec<String>,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub headers: Vec<String>,
    pub links: Vec<String>,
}

impl NormalizedFacets {
    pub fn new(item: &CandidateItem, fold_diacritics: bool) -> Self {
        let all = |values: &[String]| -> Vec<String> {
            values.iter().map(|v| normalize(v, fold_diacritics)).collect()
        };

        Self {
            name: normalize(&item.name, fold_diacritics),
            name_words: all(&item.name_tokens),
            aliases: all(&item.aliases),
            tags: all(&item.tags),
            headers: all(&item.headers),
            links: all(&item.links),
        }
    }
}

/// Normalize every item, in input order
pub(crate) fn normalize_all(items: &[CandidateItem], fold_diacritics: bool) -> Vec<NormalizedFacets> {
    if items.len() < PARALLEL_THRESHOLD {
        items
            .iter()
            .map(|item| NormalizedFacets::new(item, fold_diacritics))
            .collect()
    } else {
        items
            .par_iter()
            .map(|item| NormalizedFacets::new(item, fold_diacritics))
            .collect()
    }
}

/// Items of one session together with their normalized facets
#[derive(Debug, Clone)]
pub struct PreparedCatalog {
    items: Vec<CandidateItem>,
    facets: Vec<NormalizedFacets>,
    fold_diacritics: bool,
}

impl PreparedCatalog {
    pub fn new(items: Vec<CandidateItem>, fold_diacritics: bool) -> Self {
        let facets = normalize_all(&items, fold_diacritics);
        Self {
            items,
            facets,
            fold_diacritics,
        }
    }

    pub fn items(&self) -> &[CandidateItem] {
        &self.items
    }

    pub(crate) fn facets(&self) -> &[NormalizedFacets] {
        &self.facets
    }

    /// Diacritic setting the facets were normalized with
    pub fn fold_diacritics(&self) -> bool {
        self.fold_diacritics
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
