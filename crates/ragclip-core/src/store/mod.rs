//! Vector-store abstraction.
//!
//! The [`VectorStore`] trait covers everything the indexing and retrieval
//! pipelines need from a collection of `(id, text, metadata{file_id})`
//! triples. Ranking is the backend's business: ragclip never computes
//! embeddings itself.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`upsert`](VectorStore::upsert) | Insert or replace chunks by id |
//! | [`delete_file`](VectorStore::delete_file) | Drop every chunk of one file |
//! | [`query`](VectorStore::query) | Nearest matches for a text query |
//! | [`count`](VectorStore::count) | Number of stored chunks |

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ChunkRecord, QueryMatch};

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Short backend label for logs and `status` output.
    fn name(&self) -> &str;

    /// Insert or replace chunks. Upserting the same id twice is idempotent.
    async fn upsert(&self, chunks: &[ChunkRecord]) -> Result<()>;

    /// Remove every chunk whose metadata `file_id` matches. Returns the
    /// number of chunks removed when the backend reports it.
    async fn delete_file(&self, file_id: &str) -> Result<u64>;

    /// Return up to `limit` chunks closest to `query`, best first.
    async fn query(&self, query: &str, limit: usize) -> Result<Vec<QueryMatch>>;

    /// Total number of chunks in the collection.
    async fn count(&self) -> Result<u64>;
}

/// Lowercased alphanumeric terms of `text`, deduplicated, in first-seen order.
///
/// Shared by the lexical backends to turn free text into search terms.
pub fn query_terms(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for raw in text.split(|c: char| !c.is_alphanumeric()) {
        if raw.is_empty() {
            continue;
        }
        let term = raw.to_lowercase();
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_terms_split_and_dedup() {
        assert_eq!(
            query_terms("What is Rust? rust, RUST & cargo!"),
            vec!["what", "is", "rust", "cargo"]
        );
        assert!(query_terms("  ?! ").is_empty());
    }
}
