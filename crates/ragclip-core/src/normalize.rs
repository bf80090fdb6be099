//! Text normalization and content hashing.
//!
//! Normalization is applied before hashing and chunking so that cosmetic
//! changes (CRLF vs LF, trailing spaces, blank lines) do not trigger a
//! re-index.

use sha2::{Digest, Sha256};

/// Unify line endings, trim every line, and drop blank lines.
///
/// Returns an empty string for empty or whitespace-only input.
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    unified
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// SHA-256 hex digest of already-normalized text.
pub fn content_hash(normalized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}
