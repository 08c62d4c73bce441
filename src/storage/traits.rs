//! Storage traits and error types
//!
//! This module defines the interface the crawl consumes from a persistence
//! backend and the associated error types.

use crate::storage::{IdentityKey, LectureRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt record {key}: {message}")]
    Corrupt { key: String, message: String },

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value persistence over the identity key
///
/// No transactions or batch operations are needed: the crawl reads a key
/// once and writes it at most once per page.
pub trait RecordStore {
    /// Looks up the record stored under `key`, if any
    fn get(&self, key: &IdentityKey) -> StorageResult<Option<LectureRecord>>;

    /// Stores `record` under its key, replacing any previous record
    fn put(&mut self, record: &LectureRecord) -> StorageResult<()>;
}

impl<S: RecordStore + ?Sized> RecordStore for &mut S {
    fn get(&self, key: &IdentityKey) -> StorageResult<Option<LectureRecord>> {
        (**self).get(key)
    }

    fn put(&mut self, record: &LectureRecord) -> StorageResult<()> {
        (**self).put(record)
    }
}
