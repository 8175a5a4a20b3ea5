//! Error types for the switcher engine and its command-line driver

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Rejected search configuration, reported once at setup time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Unknown sort priority rule: {0:?}")]
    UnknownPriorityRule(String),
    #[error("Tag priority rule needs a tag name after '#'")]
    EmptyTagRule,
    #[error("Name search cannot be disabled")]
    NameFacetDisabled,
    #[error("Minimum fuzzy score must be within 0.0..=1.0, got {0}")]
    InvalidFuzzyScore(f32),
    #[error("Result cap must be at least 1")]
    ZeroMaxResults,
}

/// Failure of a single evaluation
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A newer query superseded this one before it finished
    #[error("Search was cancelled by a newer query")]
    Cancelled,
    /// The catalog was normalized under a different diacritic setting
    #[error("Catalog was prepared with a different diacritic setting than the engine")]
    CatalogMismatch,
}

/// Application error types surfaced by the binary
#[derive(Debug, Serialize)]
pub enum AppError {
    InvalidInput(String),
    InvalidConfig(String),
    CatalogLoadFailed(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            AppError::CatalogLoadFailed(msg) => write!(f, "Catalog load failed: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Stable machine-readable code, also used to pick the exit status
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::InvalidConfig(_) => "invalid_config",
            AppError::CatalogLoadFailed(_) => "catalog_load_failed",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidInput(_) => 1,
            AppError::InvalidConfig(_) => 2,
            AppError::CatalogLoadFailed(_) => 3,
            AppError::Internal(_) => 5,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::InvalidConfig(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Config(e) => e.into(),
            SearchError::Cancelled | SearchError::CatalogMismatch => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::CatalogLoadFailed(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::CatalogLoadFailed(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Keep typed config rejections distinguishable after passing through anyhow
        match err.downcast::<ConfigError>() {
            Ok(config) => config.into(),
            Err(other) => AppError::Internal(format!("{:#}", other)),
        }
    }
}
