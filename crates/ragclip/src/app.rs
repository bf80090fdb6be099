//! Process-wide application state.
//!
//! An [`App`] owns the loaded [`Config`] and the long-lived handles every
//! command needs: the vector store, the change tracker and the clipboard.
//! [`App::open`] builds the real backends from configuration;
//! [`App::new`] takes them ready-made so tests can inject in-memory ones.

use std::sync::Arc;

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::debug;

use ragclip_core::chunk::ChunkParams;
use ragclip_core::store::VectorStore;
use ragclip_core::tracker::ChangeTracker;

use crate::chroma::ChromaStore;
use crate::clipboard::{Clipboard, SystemClipboard};
use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::progress::ProgressMode;
use crate::sqlite_store::SqliteVectorStore;
use crate::tracker::SqliteTracker;

pub struct App {
    config: Config,
    store: Arc<dyn VectorStore>,
    tracker: Arc<dyn ChangeTracker>,
    clipboard: Arc<dyn Clipboard>,
    progress: ProgressMode,
    pool: Option<SqlitePool>,
}

impl App {
    pub fn new(
        config: Config,
        store: Arc<dyn VectorStore>,
        tracker: Arc<dyn ChangeTracker>,
        clipboard: Arc<dyn Clipboard>,
        progress: ProgressMode,
    ) -> Self {
        Self {
            config,
            store,
            tracker,
            clipboard,
            progress,
            pool: None,
        }
    }

    /// Open the database (running migrations), select the configured
    /// vector-store backend and the system clipboard.
    pub async fn open(config: Config, progress: ProgressMode) -> Result<Self> {
        let pool = db::connect(&config).await?;
        migrate::run_migrations(&pool).await?;

        let store: Arc<dyn VectorStore> = match config.vector_store.backend.as_str() {
            "chroma" => Arc::new(ChromaStore::new(&config.vector_store)?),
            _ => Arc::new(SqliteVectorStore::new(pool.clone())),
        };
        debug!(backend = store.name(), "vector store ready");

        let tracker = Arc::new(SqliteTracker::new(pool.clone()));
        let clipboard = Arc::new(SystemClipboard::from_config(&config.clipboard));

        let mut app = Self::new(config, store, tracker, clipboard, progress);
        app.pool = Some(pool);
        Ok(app)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &dyn VectorStore {
        self.store.as_ref()
    }

    pub fn tracker(&self) -> &dyn ChangeTracker {
        self.tracker.as_ref()
    }

    pub fn clipboard(&self) -> &dyn Clipboard {
        self.clipboard.as_ref()
    }

    pub fn chunk_params(&self) -> Result<ChunkParams> {
        self.config.chunking.params()
    }

    pub fn progress(&self) -> ProgressMode {
        self.progress
    }

    /// Close the database pool, if this app opened one.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
