//! Incremental indexing step.
//!
//! Given a file id and its raw extracted text, the [`Indexer`] normalizes
//! the text, hashes it, consults the [`ChangeTracker`], and only when the
//! hash changed replaces the file's chunks in the [`VectorStore`].
//!
//! # Write ordering
//!
//! 1. forget the file's tracker record
//! 2. delete the file's previous chunks (no orphans when the count shrinks)
//! 3. upsert the new chunks
//! 4. record the new hash
//!
//! The old hash is gone before any chunk is touched and the new one is
//! committed last. A failure in steps 2–3 leaves the file without a
//! record, so the next run re-indexes it whatever its content is.

use anyhow::{Context, Result};
use tracing::debug;

use crate::chunk::{chunk_text, ChunkParams};
use crate::models::ChunkRecord;
use crate::normalize::{content_hash, normalize_text};
use crate::store::VectorStore;
use crate::tracker::ChangeTracker;

/// What happened (or, for a dry run, what would happen) to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// Nothing left after normalization; no writes.
    Empty,
    /// Hash matches the tracker; no writes.
    Unchanged,
    /// Chunks were (or would be) written.
    Indexed { chunks: usize, removed: u64 },
}

enum Prepared {
    Empty,
    Unchanged,
    Changed {
        hash: String,
        chunks: Vec<ChunkRecord>,
    },
}

pub struct Indexer<'a> {
    store: &'a dyn VectorStore,
    tracker: &'a dyn ChangeTracker,
    params: ChunkParams,
}

impl<'a> Indexer<'a> {
    pub fn new(
        store: &'a dyn VectorStore,
        tracker: &'a dyn ChangeTracker,
        params: ChunkParams,
    ) -> Self {
        Self {
            store,
            tracker,
            params,
        }
    }

    async fn prepare(&self, file_id: &str, raw_text: &str) -> Result<Prepared> {
        let content = normalize_text(raw_text);
        if content.is_empty() {
            return Ok(Prepared::Empty);
        }
        let hash = content_hash(&content);
        if self.tracker.is_vectorized(file_id, &hash).await? {
            return Ok(Prepared::Unchanged);
        }
        let chunks = chunk_text(file_id, &content, self.params);
        Ok(Prepared::Changed { hash, chunks })
    }

    /// Index one file's raw text, writing only when its content changed.
    pub async fn index_text(&self, file_id: &str, raw_text: &str) -> Result<IndexOutcome> {
        let (hash, chunks) = match self.prepare(file_id, raw_text).await? {
            Prepared::Empty => return Ok(IndexOutcome::Empty),
            Prepared::Unchanged => return Ok(IndexOutcome::Unchanged),
            Prepared::Changed { hash, chunks } => (hash, chunks),
        };

        self.tracker
            .forget(file_id)
            .await
            .with_context(|| format!("Failed to clear hash for {}", file_id))?;
        let removed = self
            .store
            .delete_file(file_id)
            .await
            .with_context(|| format!("Failed to remove previous chunks for {}", file_id))?;
        self.store
            .upsert(&chunks)
            .await
            .with_context(|| format!("Failed to store chunks for {}", file_id))?;
        self.tracker
            .record(file_id, &hash, chunks.len() as i64)
            .await
            .with_context(|| format!("Failed to record hash for {}", file_id))?;

        debug!(file_id, chunks = chunks.len(), removed, "indexed");
        Ok(IndexOutcome::Indexed {
            chunks: chunks.len(),
            removed,
        })
    }

    /// Report what [`index_text`](Self::index_text) would do without
    /// writing anything. `removed` is always 0 in a plan.
    pub async fn plan(&self, file_id: &str, raw_text: &str) -> Result<IndexOutcome> {
        Ok(match self.prepare(file_id, raw_text).await? {
            Prepared::Empty => IndexOutcome::Empty,
            Prepared::Unchanged => IndexOutcome::Unchanged,
            Prepared::Changed { chunks, .. } => IndexOutcome::Indexed {
                chunks: chunks.len(),
                removed: 0,
            },
        })
    }
}
