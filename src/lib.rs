//! vault-switcher
//!
//! As-you-type ranking of notes and not-yet-created notes by file name,
//! aliases, tags, headers and links. The [`search`] module is the pure,
//! synchronous engine; [`session`] adds debounced, last-call-wins
//! evaluation on top of it for interactive drivers.

pub mod catalog;
pub mod config;
pub mod error;
pub mod search;
pub mod session;

pub use config::{SearchConfig, SearchFacets};
pub use error::{AppError, ConfigError, SearchError};
pub use search::{CandidateItem, SearchEngine, SearchOutcome, Suggestion};
pub use session::SearchSession;
