//! In-memory [`VectorStore`] for tests.
//!
//! Chunks live in a `BTreeMap` behind `std::sync::RwLock`. Queries score
//! each chunk by the number of distinct query terms it contains, which is
//! enough to exercise the retrieval pipeline without an embedding model.
//! The store also counts writes and queries so tests can assert on side
//! effects.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ChunkRecord, QueryMatch};

use super::{query_terms, VectorStore};

pub struct InMemoryVectorStore {
    chunks: RwLock<BTreeMap<String, ChunkRecord>>,
    writes: AtomicUsize,
    queries: AtomicUsize,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(BTreeMap::new()),
            writes: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of mutating calls (`upsert`, and `delete_file` calls that
    /// removed something).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of `query` calls.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Ids of every stored chunk, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.chunks.read().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<ChunkRecord> {
        self.chunks.read().unwrap().get(id).cloned()
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upsert(&self, chunks: &[ChunkRecord]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        let mut stored = self.chunks.write().unwrap();
        for c in chunks {
            stored.insert(c.id.clone(), c.clone());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_file(&self, file_id: &str) -> Result<u64> {
        let mut stored = self.chunks.write().unwrap();
        let before = stored.len();
        stored.retain(|_, c| c.file_id != file_id);
        let removed = (before - stored.len()) as u64;
        if removed > 0 {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }

    async fn query(&self, query: &str, limit: usize) -> Result<Vec<QueryMatch>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let terms = query_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let stored = self.chunks.read().unwrap();
        let mut matches: Vec<QueryMatch> = stored
            .values()
            .filter_map(|c| {
                let text_lower = c.text.to_lowercase();
                let hits = terms.iter().filter(|t| text_lower.contains(t.as_str())).count();
                (hits > 0).then(|| QueryMatch {
                    id: c.id.clone(),
                    file_id: c.file_id.clone(),
                    text: c.text.clone(),
                    score: hits as f64,
                })
            })
            .collect();
        // Stable sort keeps id order among equal scores.
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(limit);
        Ok(matches)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.chunks.read().unwrap().len() as u64)
    }
}
