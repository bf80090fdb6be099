//! Clipboard question → grounded prompt.
//!
//! Reads the question (clipboard, or `--query`), optionally refreshes the
//! index first, retrieves the nearest chunks and hands the assembled
//! prompt back (clipboard, or stdout with `--stdout`).

use tracing::info;

use ragclip_core::retrieve::{retrieve, Retrieval, RetrieveError};

use crate::app::App;
use crate::ingest::{run_index, IndexOptions};

#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    /// Use this text instead of reading the clipboard.
    pub query: Option<String>,
    /// Run an indexing pass before retrieving, regardless of config.
    pub refresh: bool,
    /// Print the prompt instead of writing it to the clipboard.
    pub stdout: bool,
}

impl AskOptions {
    /// What to tell the user when the question turned out empty.
    pub fn empty_query_message(&self) -> String {
        match self.query {
            Some(_) => "--query is empty, pass a question".to_string(),
            None => RetrieveError::EmptyQuery.to_string(),
        }
    }
}

/// Run the retrieval pipeline once.
///
/// An empty question returns [`RetrieveError::EmptyQuery`] before any
/// indexing, store query or clipboard write happens.
pub async fn run_ask(app: &App, options: &AskOptions) -> Result<Retrieval, RetrieveError> {
    let raw_query = match &options.query {
        Some(q) => q.clone(),
        None => app.clipboard().read().await?,
    };
    if raw_query.trim().is_empty() {
        return Err(RetrieveError::EmptyQuery);
    }

    if options.refresh || app.config().retrieval.always_refresh {
        let summary = run_index(app, &IndexOptions::default()).await?;
        info!(indexed = summary.indexed, "refreshed index before query");
    }

    let retrieval = retrieve(
        app.store(),
        &raw_query,
        app.config().retrieval.top_k,
        app.config().retrieval.system_prompt(),
    )
    .await?;

    if options.stdout {
        println!("{}", retrieval.prompt);
    } else {
        app.clipboard().write(&retrieval.prompt).await?;
        println!(
            "ask: prompt copied to clipboard ({} chunks, {} chars)",
            retrieval.matches.len(),
            retrieval.prompt.chars().count()
        );
    }
    Ok(retrieval)
}
