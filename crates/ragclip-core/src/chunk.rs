//! Sliding-window text chunker.
//!
//! Splits normalized file text into overlapping fixed-size windows measured
//! in characters. Each window becomes a [`ChunkRecord`] with a file-scoped
//! id (`"{file_id}::chunk_{n}"`).
//!
//! # Algorithm
//!
//! 1. Start at character 0.
//! 2. Emit `text[start .. start + size]` (clamped to the end of the text).
//! 3. Stop once a window reaches the end of the text.
//! 4. Otherwise advance `start` by `size - overlap` and repeat.
//!
//! [`ChunkParams::new`] rejects `overlap >= size`, so the window always
//! advances.
//!
//! # Example
//!
//! ```rust
//! use ragclip_core::chunk::{window_text, ChunkParams};
//!
//! let params = ChunkParams::new(4, 1).unwrap();
//! assert_eq!(window_text("abcdefghij", params), vec!["abcd", "defg", "ghij"]);
//! ```

use thiserror::Error;

use crate::models::ChunkRecord;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk size must be > 0")]
    ZeroSize,
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

/// Validated window parameters, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    size: usize,
    overlap: usize,
}

impl ChunkParams {
    pub fn new(size: usize, overlap: usize) -> Result<Self, ChunkError> {
        if size == 0 {
            return Err(ChunkError::ZeroSize);
        }
        if overlap >= size {
            return Err(ChunkError::OverlapTooLarge { size, overlap });
        }
        Ok(Self { size, overlap })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    fn stride(&self) -> usize {
        self.size - self.overlap
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Split `text` into overlapping windows. Empty text yields no windows.
pub fn window_text(text: &str, params: ChunkParams) -> Vec<&str> {
    // Byte offset of every char boundary, plus the end of the string.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = bounds.len() - 1;

    let mut windows = Vec::new();
    let mut start = 0usize;
    while start < char_len {
        let end = (start + params.size).min(char_len);
        windows.push(&text[bounds[start]..bounds[end]]);
        if end == char_len {
            break;
        }
        start += params.stride();
    }
    windows
}

/// Chunk a file's normalized text into [`ChunkRecord`]s with contiguous
/// indices starting at 0.
pub fn chunk_text(file_id: &str, text: &str, params: ChunkParams) -> Vec<ChunkRecord> {
    window_text(text, params)
        .into_iter()
        .enumerate()
        .map(|(i, window)| ChunkRecord::new(file_id, i as i64, window))
        .collect()
}
