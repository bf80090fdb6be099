//! Change-tracking abstraction.
//!
//! A [`ChangeTracker`] keeps the durable `file_id → content_hash` mapping
//! that decides whether a file must be re-indexed. The SQLite
//! implementation lives in the application crate; [`InMemoryTracker`]
//! serves tests.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::FileRecord;

#[async_trait]
pub trait ChangeTracker: Send + Sync {
    /// True iff a record exists with exactly this id and hash.
    async fn is_vectorized(&self, file_id: &str, hash: &str) -> Result<bool>;

    /// Insert or replace the hash recorded for `file_id`.
    async fn record(&self, file_id: &str, hash: &str, chunk_count: i64) -> Result<()>;

    /// Drop the record for `file_id`, so no hash matches it until the
    /// next successful [`record`](Self::record).
    async fn forget(&self, file_id: &str) -> Result<()>;

    /// Look up the record for a file, if any.
    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>>;

    /// All records ordered by file id.
    async fn list(&self) -> Result<Vec<FileRecord>>;
}

/// In-memory tracker for tests. Records carry `indexed_at = 0`.
pub struct InMemoryTracker {
    records: RwLock<BTreeMap<String, FileRecord>>,
}

impl InMemoryTracker {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChangeTracker for InMemoryTracker {
    async fn is_vectorized(&self, file_id: &str, hash: &str) -> Result<bool> {
        let records = self.records.read().unwrap();
        Ok(records
            .get(file_id)
            .is_some_and(|r| r.content_hash == hash))
    }

    async fn record(&self, file_id: &str, hash: &str, chunk_count: i64) -> Result<()> {
        let mut records = self.records.write().unwrap();
        records.insert(
            file_id.to_string(),
            FileRecord {
                file_id: file_id.to_string(),
                content_hash: hash.to_string(),
                chunk_count,
                indexed_at: 0,
            },
        );
        Ok(())
    }

    async fn forget(&self, file_id: &str) -> Result<()> {
        self.records.write().unwrap().remove(file_id);
        Ok(())
    }

    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>> {
        Ok(self.records.read().unwrap().get(file_id).cloned())
    }

    async fn list(&self) -> Result<Vec<FileRecord>> {
        Ok(self.records.read().unwrap().values().cloned().collect())
    }
}
