//! Lecture-Harvester: an incremental lecture catalogue importer
//!
//! This crate walks a paginated listing of lecture pages, extracts a structured
//! record from each page and stores it with conflict-aware upsert semantics,
//! respecting the site's robots.txt.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Lecture-Harvester operations
///
/// Every variant is fatal to a run. Per-page conditions that the crawl
/// recovers from are modelled as [`extract::SkipReason`] and
/// [`output::Outcome`] values instead.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Lecture-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlRunner, CrawlSettings, Fetcher, HttpFetcher, PageEnumerator};
pub use extract::{CrawlCandidate, RecordBuilder, SkipReason};
pub use output::{Outcome, OutcomeCounters};
pub use robots::{ExclusionPolicy, RobotsPolicy};
pub use state::{ExistingState, UpsertDecision, UpsertPolicy};
pub use storage::{IdentityKey, LectureRecord, MemoryStore, RecordStore, SqliteStorage};
