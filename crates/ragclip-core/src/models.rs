//! Core data models shared by the indexing and retrieval pipelines.

use serde::{Deserialize, Serialize};

/// Durable bookkeeping entry for a file that has been indexed.
///
/// Keyed by `file_id` (the file's path string). The `content_hash` is the
/// SHA-256 of the file's normalized text at the time it was indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_id: String,
    pub content_hash: String,
    pub chunk_count: i64,
    /// Unix timestamp (seconds) of the last successful index.
    pub indexed_at: i64,
}

/// A window of normalized file text stored in the vector store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// `"{file_id}::chunk_{index}"`.
    pub id: String,
    pub file_id: String,
    pub chunk_index: i64,
    pub text: String,
}

impl ChunkRecord {
    pub fn new(file_id: &str, chunk_index: i64, text: impl Into<String>) -> Self {
        Self {
            id: chunk_id(file_id, chunk_index),
            file_id: file_id.to_string(),
            chunk_index,
            text: text.into(),
        }
    }
}

/// Build the file-scoped chunk id used as the vector-store key.
pub fn chunk_id(file_id: &str, chunk_index: i64) -> String {
    format!("{}::chunk_{}", file_id, chunk_index)
}

/// A chunk returned from a nearest-match query, best match first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMatch {
    pub id: String,
    pub file_id: String,
    pub text: String,
    /// Backend-specific relevance; higher is better.
    pub score: f64,
}
