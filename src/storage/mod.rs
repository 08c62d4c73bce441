//! Storage module for persisting lecture records
//!
//! This module handles all persistence for the harvester, including:
//! - The `LectureRecord` entity and its identity key
//! - The `RecordStore` interface consumed by the crawl
//! - A SQLite backend with run bookkeeping
//! - An in-memory backend for tests

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStorage;
pub use traits::{RecordStore, StorageError, StorageResult};

use crate::output::OutcomeCounters;
use crate::HarvestError;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, HarvestError> {
    SqliteStorage::new(path)
}

/// Stable identity of a lecture: `lecturer|day|start`
///
/// Built from the exact extracted strings, so it survives changes to the
/// source URL or the audio filename. Two lectures by the same lecturer
/// cannot start on the same day at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(lecturer: &str, day: &str, start_time: &str) -> Self {
        Self(format!("{}|{}|{}", lecturer, day, start_time))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rebuilds a key read back from storage
    pub(crate) fn from_stored(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A lecture as persisted in the store
#[derive(Debug, Clone, PartialEq)]
pub struct LectureRecord {
    /// Identity key; never changes once assigned
    pub key: IdentityKey,

    /// URL of the target page the record was extracted from
    pub source: String,

    /// SHA-256 of the source URL, used downstream as a scheduling seed
    pub content_hash: Vec<u8>,

    /// When the page was scraped
    pub scraped: DateTime<Utc>,

    pub title: Option<String>,
    pub type_title: Option<String>,
    pub lesson_type: Option<String>,
    pub lecturer: String,
    pub function: Option<String>,

    /// Day of the lecture at midnight
    pub date: NaiveDateTime,

    /// Start time exactly as shown on the page
    pub start_time: String,

    /// End time exactly as shown on the page
    pub end_time: String,

    pub duration_sec: u32,
    pub audio_link: String,

    /// Two-letter language code
    pub language: String,

    pub chair: Option<String>,
    pub video_link: Option<String>,

    /// Downstream workflow: the record has been queued for conversion
    pub scheduled: bool,

    /// Downstream workflow: the record has been consumed; never overwritten
    pub converted: bool,
}

/// Represents a harvest run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub project_id: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: Option<String>,
    pub status: RunStatus,
    pub outcomes: OutcomeCounters,
}

/// Status of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
