//! `ragclip status`: what the change tracker knows.

use std::path::Path;

use anyhow::Result;

use ragclip_core::models::FileRecord;

use crate::app::App;

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub backend: String,
    pub files: Vec<FileRecord>,
    pub tracked_chunks: i64,
    pub stored_chunks: u64,
    /// Tracked files that no longer exist on disk. Their chunks stay
    /// searchable until the file reappears with different content.
    pub missing: Vec<String>,
}

pub async fn run_status(app: &App) -> Result<StatusReport> {
    let files = app.tracker().list().await?;
    let tracked_chunks = files.iter().map(|f| f.chunk_count).sum();
    let stored_chunks = app.store().count().await?;
    let missing = files
        .iter()
        .filter(|f| !Path::new(&f.file_id).exists())
        .map(|f| f.file_id.clone())
        .collect();

    Ok(StatusReport {
        backend: app.store().name().to_string(),
        files,
        tracked_chunks,
        stored_chunks,
        missing,
    })
}

impl StatusReport {
    pub fn print(&self) {
        println!("status");
        println!("  vector store: {}", self.backend);
        println!("  tracked files: {}", self.files.len());
        println!("  tracked chunks: {}", self.tracked_chunks);
        println!("  stored chunks: {}", self.stored_chunks);
        println!("  missing files: {}", self.missing.len());
        for id in &self.missing {
            println!("    {}", id);
        }
    }
}
