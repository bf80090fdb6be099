//! Query → nearest chunks → prompt.

use thiserror::Error;
use tracing::info;

use crate::models::QueryMatch;
use crate::prompt::build_prompt;
use crate::store::VectorStore;

pub const DEFAULT_TOP_K: usize = 3;

/// Characters of the query echoed to the log.
const QUERY_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum RetrieveError {
    /// Nothing to search for. Reported to the user; no side effects.
    #[error("clipboard is empty, copy a question first")]
    EmptyQuery,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// The assembled prompt plus the chunks that went into it.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub query: String,
    pub matches: Vec<QueryMatch>,
    pub prompt: String,
}

/// Trim `raw_query`, fetch the `top_k` nearest chunks, and build the prompt.
///
/// An empty (or whitespace-only) query fails with
/// [`RetrieveError::EmptyQuery`] before the store is touched.
pub async fn retrieve(
    store: &dyn VectorStore,
    raw_query: &str,
    top_k: usize,
    system_prompt: &str,
) -> Result<Retrieval, RetrieveError> {
    let query = raw_query.trim();
    if query.is_empty() {
        return Err(RetrieveError::EmptyQuery);
    }

    info!(query = %preview(query), "processing query");
    let matches = store.query(query, top_k).await?;
    let prompt = build_prompt(system_prompt, query, &matches);

    Ok(Retrieval {
        query: query.to_string(),
        matches,
        prompt,
    })
}

fn preview(query: &str) -> String {
    let mut out: String = query.chars().take(QUERY_PREVIEW_CHARS).collect();
    if query.chars().count() > QUERY_PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
