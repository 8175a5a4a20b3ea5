//! Search configuration: facet toggles, fuzzy settings, sort priorities
//!
//! Values come from user-managed settings. A configuration is validated once
//! when a search session starts and stays immutable for every query of that
//! session.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::ConfigError;
use crate::search::item::FacetKind;
use crate::search::ranking::{default_priorities, PriorityRule};

/// Which facets are searched. Name (with aliases) is always on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFacets {
    pub name: bool,
    pub tag: bool,
    pub header: bool,
    pub link: bool,
}

impl Default for SearchFacets {
    fn default() -> Self {
        Self {
            name: true,
            tag: true,
            header: false,
            link: false,
        }
    }
}

impl SearchFacets {
    pub fn is_enabled(&self, facet: FacetKind) -> bool {
        match facet {
            FacetKind::Name | FacetKind::Alias => self.name,
            FacetKind::Tag => self.tag,
            FacetKind::Header => self.header,
            FacetKind::Link => self.link,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    pub facets: SearchFacets,
    pub allow_fuzzy: bool,
    /// Facets fuzzy matching applies to when `allow_fuzzy` is set
    pub fuzzy_targets: Vec<FacetKind>,
    pub min_fuzzy_score: f32,
    pub normalize_diacritics: bool,
    pub sort_priorities: Vec<PriorityRule>,
    pub max_results: usize,
    /// Keystroke coalescing window, honored by the session layer only
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            facets: SearchFacets::default(),
            allow_fuzzy: false,
            fuzzy_targets: vec![FacetKind::Name, FacetKind::Alias],
            min_fuzzy_score: 0.5,
            normalize_diacritics: true,
            sort_priorities: default_priorities(),
            max_results: 50,
            debounce_ms: 0,
        }
    }
}

impl SearchConfig {
    /// Replace the priority list from its settings spelling
    pub fn with_priorities<S: AsRef<str>>(mut self, rules: &[S]) -> Result<Self, ConfigError> {
        self.sort_priorities = rules
            .iter()
            .map(|r| r.as_ref().parse())
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Reject settings that would make ranking ill-defined
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.facets.name {
            return Err(ConfigError::NameFacetDisabled);
        }
        if !(0.0..=1.0).contains(&self.min_fuzzy_score) {
            return Err(ConfigError::InvalidFuzzyScore(self.min_fuzzy_score));
        }
        if self.max_results == 0 {
            return Err(ConfigError::ZeroMaxResults);
        }
        for rule in &self.sort_priorities {
            if let PriorityRule::Tag(tag) = rule {
                if tag.trim_start_matches('#').is_empty() {
                    return Err(ConfigError::EmptyTagRule);
                }
            }
        }
        Ok(())
    }

    pub fn fuzzy_applies(&self, facet: FacetKind) -> bool {
        self.allow_fuzzy && self.fuzzy_targets.contains(&facet)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Default location of the settings file
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Cannot determine config directory")?;
    Ok(config_dir.join("vault-switcher").join("config.json"))
}

/// Load and validate a configuration; a missing file yields the defaults
pub fn load_config(path: &Path) -> Result<SearchConfig> {
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(SearchConfig::default());
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: SearchConfig = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    config.validate()?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &SearchConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let data = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, data).context("Failed to write config file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.facets.name);
        assert!(!config.allow_fuzzy);
        assert_eq!(config.max_results, 50);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SearchConfig::default();
        config.facets.name = false;
        assert_eq!(config.validate(), Err(ConfigError::NameFacetDisabled));

        let mut config = SearchConfig::default();
        config.min_fuzzy_score = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::InvalidFuzzyScore(1.5)));

        let mut config = SearchConfig::default();
        config.min_fuzzy_score = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFuzzyScore(_))));

        let mut config = SearchConfig::default();
        config.max_results = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxResults));
    }

    #[test]
    fn test_with_priorities_rejects_unknown_rule() {
        let result = SearchConfig::default().with_priorities(&["starred", "newest-first"]);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::UnknownPriorityRule("newest-first".to_string())
        );
    }

    #[test]
    fn test_fuzzy_applies_only_to_targets() {
        let mut config = SearchConfig::default();
        assert!(!config.fuzzy_applies(FacetKind::Name));

        config.allow_fuzzy = true;
        assert!(config.fuzzy_applies(FacetKind::Name));
        assert!(config.fuzzy_applies(FacetKind::Alias));
        assert!(!config.fuzzy_applies(FacetKind::Tag));
    }

    #[test]
    fn test_facets_enabled() {
        let facets = SearchFacets::default();
        assert!(facets.is_enabled(FacetKind::Name));
        assert!(facets.is_enabled(FacetKind::Alias));
        assert!(facets.is_enabled(FacetKind::Tag));
        assert!(!facets.is_enabled(FacetKind::Header));
        assert!(!facets.is_enabled(FacetKind::Link));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: SearchConfig = serde_json::from_str(
            r##"{"allowFuzzy": true, "sortPriorities": ["starred", "#work", "last-opened"]}"##,
        )
        .unwrap();
        assert!(config.allow_fuzzy);
        assert_eq!(config.max_results, 50);
        assert_eq!(
            config.sort_priorities,
            vec![
                PriorityRule::Starred,
                PriorityRule::Tag("#work".to_string()),
                PriorityRule::LastOpened,
            ]
        );
    }

    #[test]
    fn test_unknown_rule_in_json_is_rejected() {
        let result: Result<SearchConfig, _> =
            serde_json::from_str(r#"{"sortPriorities": ["random"]}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Unknown sort priority rule"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = SearchConfig::default();
        config.facets.header = true;
        config.debounce_ms = 120;
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.debounce(), Duration::from_millis(120));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, SearchConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"maxResults": 0}"#).unwrap();

        let err = load_config(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::ZeroMaxResults)
        );
    }
}
