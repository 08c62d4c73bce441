//! In-memory storage implementation
//!
//! A `HashMap`-backed RecordStore that also logs every write, so tests can
//! assert exactly which records a crawl persisted.

use crate::storage::traits::{RecordStore, StorageResult};
use crate::storage::{IdentityKey, LectureRecord};
use std::collections::HashMap;

/// In-memory storage backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<IdentityKey, LectureRecord>,
    writes: Vec<IdentityKey>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record without logging it as a write
    pub fn insert_existing(&mut self, record: LectureRecord) {
        self.records.insert(record.key.clone(), record);
    }

    /// Keys passed to `put`, in call order
    pub fn writes(&self) -> &[IdentityKey] {
        &self.writes
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &IdentityKey) -> StorageResult<Option<LectureRecord>> {
        Ok(self.records.get(key).cloned())
    }

    fn put(&mut self, record: &LectureRecord) -> StorageResult<()> {
        self.writes.push(record.key.clone());
        self.records.insert(record.key.clone(), record.clone());
        Ok(())
    }
}
