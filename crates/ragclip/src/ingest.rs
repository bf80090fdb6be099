//! Indexing pass orchestration.
//!
//! Coordinates the full flow: scan → extract → normalize/hash → chunk →
//! vector store. Each file goes through the core
//! [`Indexer`](ragclip_core::index::Indexer), which skips files whose
//! normalized content hash is already recorded.

use anyhow::{Context, Result};
use tracing::{debug, info};

use ragclip_core::index::{IndexOutcome, Indexer};

use crate::app::App;
use crate::extract::extract_file;
use crate::progress::IndexEvent;
use crate::scan::scan_sources;

#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Report what would change without writing.
    pub dry_run: bool,
    /// Stop after this many files (in scan order).
    pub limit: Option<usize>,
}

/// Counters for one indexing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub dry_run: bool,
    pub scanned: u64,
    pub indexed: u64,
    pub unchanged: u64,
    pub empty: u64,
    pub chunks_written: u64,
    pub chunks_removed: u64,
}

impl IndexSummary {
    fn add(&mut self, outcome: &IndexOutcome) {
        match outcome {
            IndexOutcome::Empty => self.empty += 1,
            IndexOutcome::Unchanged => self.unchanged += 1,
            IndexOutcome::Indexed { chunks, removed } => {
                self.indexed += 1;
                self.chunks_written += *chunks as u64;
                self.chunks_removed += removed;
            }
        }
    }

    pub fn print(&self) {
        if self.dry_run {
            println!("index (dry-run)");
            println!("  scanned: {} files", self.scanned);
            println!("  would index: {}", self.indexed);
            println!("  unchanged: {}", self.unchanged);
            println!("  empty/skipped: {}", self.empty);
            println!("  estimated chunks: {}", self.chunks_written);
            return;
        }
        println!("index");
        println!("  scanned: {} files", self.scanned);
        println!("  indexed: {}", self.indexed);
        println!("  unchanged: {}", self.unchanged);
        println!("  empty/skipped: {}", self.empty);
        println!("  chunks written: {}", self.chunks_written);
        println!("  stale chunks removed: {}", self.chunks_removed);
        println!("ok");
    }
}

pub async fn run_index(app: &App, options: &IndexOptions) -> Result<IndexSummary> {
    let config = app.config();
    let progress = app.progress();

    progress.report(IndexEvent::Scanning {
        directories: config.sources.directories.len(),
    });
    let mut files = scan_sources(config)?;
    if let Some(limit) = options.limit {
        files.truncate(limit);
    }

    let indexer = Indexer::new(app.store(), app.tracker(), app.chunk_params()?);
    let max_bytes = config.sources.max_file_bytes;
    let total = files.len();
    let mut summary = IndexSummary {
        dry_run: options.dry_run,
        ..IndexSummary::default()
    };

    for (n, file) in files.into_iter().enumerate() {
        summary.scanned += 1;

        let path = file.path.clone();
        let text = tokio::task::spawn_blocking(move || extract_file(&path, max_bytes))
            .await
            .with_context(|| format!("Extraction task failed for {}", file.path.display()))?;

        let outcome = if options.dry_run {
            indexer.plan(&file.file_id, &text).await?
        } else {
            indexer.index_text(&file.file_id, &text).await?
        };
        debug!(file = %file.file_id, ?outcome, "processed");
        summary.add(&outcome);

        progress.report(IndexEvent::File { n: n + 1, total });
    }

    info!(
        scanned = summary.scanned,
        indexed = summary.indexed,
        unchanged = summary.unchanged,
        dry_run = summary.dry_run,
        "index pass finished"
    );
    Ok(summary)
}
