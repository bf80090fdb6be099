//! Configuration parsing and validation.
//!
//! ragclip is configured via a TOML file (default: `config/ragclip.toml`).
//! The file is parsed into a [`Config`] struct and validated by
//! [`load_config`] before any command runs.
//!
//! # Example
//!
//! ```toml
//! [db]
//! path = "./data/ragclip.sqlite"
//!
//! [sources]
//! directories = ["~/Downloads/web_archive", "./notes"]
//! extensions = ["txt", "pdf", "docx", "xlsx", "html"]
//!
//! [chunking]
//! size = 1000
//! overlap = 200
//!
//! [retrieval]
//! top_k = 3
//! always_refresh = false
//!
//! [vector_store]
//! backend = "sqlite"
//! ```
//!
//! # Validation Rules
//!
//! - `chunking.size` must be > 0 and `chunking.overlap` < `chunking.size`
//! - `retrieval.top_k` must be ≥ 1
//! - `sources.directories` and `sources.extensions` must be non-empty
//! - `vector_store.backend` must be `sqlite` or `chroma`
//! - `chroma` needs a `url` and `server_embeds = true`
//! - clipboard commands, when given, must name a program

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use ragclip_core::chunk::{ChunkParams, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use ragclip_core::prompt::DEFAULT_SYSTEM_PROMPT;
use ragclip_core::retrieve::DEFAULT_TOP_K;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    /// SQLite file holding the change tracker (and the `sqlite` vector store).
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    pub directories: Vec<PathBuf>,
    /// Extension allow-list, without the leading dot. Matched case-insensitively.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Globs matched against the path relative to its source directory.
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

fn default_extensions() -> Vec<String> {
    ["txt", "pdf", "docx", "xlsx", "html"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_file_bytes() -> u64 {
    50 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

impl ChunkingConfig {
    /// Validated window parameters. [`load_config`] has already checked
    /// them, so this only fails for hand-built configs.
    pub fn params(&self) -> Result<ChunkParams> {
        Ok(ChunkParams::new(self.size, self.overlap)?)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Run a full index pass before every query.
    #[serde(default)]
    pub always_refresh: bool,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            always_refresh: false,
            system_prompt: None,
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl RetrievalConfig {
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct VectorStoreConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub url: Option<String>,
    /// The server embeds `documents` and `query_texts` itself.
    #[serde(default)]
    pub server_embeds: bool,
    #[serde(default = "default_tenant")]
    pub tenant: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            collection: default_collection(),
            url: None,
            server_embeds: false,
            tenant: default_tenant(),
            database: default_database(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_backend() -> String {
    "sqlite".to_string()
}
fn default_collection() -> String {
    "ALL_TEXT_FILES".to_string()
}
fn default_tenant() -> String {
    "default_tenant".to_string()
}
fn default_database() -> String {
    "default_database".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

/// Optional overrides for the system clipboard tools. Each command is a
/// program followed by its arguments.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClipboardConfig {
    #[serde(default)]
    pub read_command: Option<Vec<String>>,
    #[serde(default)]
    pub write_command: Option<Vec<String>>,
}

impl Config {
    /// Source directories with a leading `~` expanded.
    pub fn source_directories(&self) -> Vec<PathBuf> {
        self.sources
            .directories
            .iter()
            .map(|d| expand_home(d))
            .collect()
    }

    pub fn db_path(&self) -> PathBuf {
        expand_home(&self.db.path)
    }
}

/// Replace a leading `~` with `$HOME` (or `%USERPROFILE%` on Windows).
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;

    // Validate chunking
    ChunkParams::new(config.chunking.size, config.chunking.overlap)
        .with_context(|| "Invalid [chunking] settings")?;

    // Validate retrieval
    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    // Validate sources
    if config.sources.directories.is_empty() {
        anyhow::bail!("sources.directories must list at least one directory");
    }
    config.sources.extensions = config
        .sources
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    if config.sources.extensions.is_empty() {
        anyhow::bail!("sources.extensions must list at least one extension");
    }

    // Validate vector store
    match config.vector_store.backend.as_str() {
        "sqlite" => {}
        "chroma" => {
            if config.vector_store.url.is_none() {
                anyhow::bail!("vector_store.url must be specified when backend is 'chroma'");
            }
            if !config.vector_store.server_embeds {
                anyhow::bail!(
                    "the chroma backend sends raw text and needs a server that embeds \
                     documents and query_texts itself; a stock Chroma server expects \
                     client-side embeddings. Set vector_store.server_embeds = true once \
                     the server does this, or use backend = \"sqlite\"."
                );
            }
        }
        other => anyhow::bail!(
            "Unknown vector store backend: '{}'. Must be sqlite or chroma.",
            other
        ),
    }
    if config.vector_store.collection.trim().is_empty() {
        anyhow::bail!("vector_store.collection must not be empty");
    }

    // Validate clipboard overrides
    for (key, cmd) in [
        ("clipboard.read_command", &config.clipboard.read_command),
        ("clipboard.write_command", &config.clipboard.write_command),
    ] {
        if let Some(cmd) = cmd {
            if cmd.first().map_or(true, |p| p.trim().is_empty()) {
                anyhow::bail!("{} must name a program", key);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[db]
path = "./data/ragclip.sqlite"

[sources]
directories = ["./docs"]
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = parse_config(MINIMAL).unwrap();
        assert_eq!(cfg.chunking.size, 1000);
        assert_eq!(cfg.chunking.overlap, 200);
        assert_eq!(cfg.retrieval.top_k, 3);
        assert!(!cfg.retrieval.always_refresh);
        assert_eq!(cfg.retrieval.system_prompt(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(cfg.vector_store.backend, "sqlite");
        assert_eq!(cfg.vector_store.collection, "ALL_TEXT_FILES");
        assert_eq!(
            cfg.sources.extensions,
            vec!["txt", "pdf", "docx", "xlsx", "html"]
        );
        assert!(!cfg.sources.recursive);
    }

    #[test]
    fn extensions_are_normalized() {
        let text = format!("{}extensions = [\".TXT\", \" Md \", \"\"]\n", MINIMAL);
        let cfg = parse_config(&text).unwrap();
        assert_eq!(cfg.sources.extensions, vec!["txt", "md"]);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        let text = format!("{}\n[chunking]\nsize = 100\noverlap = 100\n", MINIMAL);
        let err = parse_config(&text).unwrap_err();
        assert!(format!("{:#}", err).contains("overlap"));
    }

    #[test]
    fn rejects_zero_top_k() {
        let text = format!("{}\n[retrieval]\ntop_k = 0\n", MINIMAL);
        assert!(parse_config(&text).is_err());
    }

    #[test]
    fn chroma_requires_url() {
        let text = format!(
            "{}\n[vector_store]\nbackend = \"chroma\"\nserver_embeds = true\n",
            MINIMAL
        );
        assert!(parse_config(&text).is_err());

        let text = format!(
            "{}\n[vector_store]\nbackend = \"chroma\"\nurl = \"http://localhost:8000\"\n\
             server_embeds = true\n",
            MINIMAL
        );
        assert!(parse_config(&text).is_ok());
    }

    #[test]
    fn chroma_requires_server_side_embedding() {
        let text = format!(
            "{}\n[vector_store]\nbackend = \"chroma\"\nurl = \"http://localhost:8000\"\n",
            MINIMAL
        );
        let err = parse_config(&text).unwrap_err().to_string();
        assert!(err.contains("server_embeds"), "got: {}", err);
        assert!(err.contains("client-side embeddings"), "got: {}", err);
    }

    #[test]
    fn rejects_unknown_backend() {
        let text = format!("{}\n[vector_store]\nbackend = \"pinecone\"\n", MINIMAL);
        assert!(parse_config(&text).is_err());
    }

    #[test]
    fn rejects_empty_clipboard_command() {
        let text = format!("{}\n[clipboard]\nread_command = []\n", MINIMAL);
        assert!(parse_config(&text).is_err());
    }

    #[test]
    fn rejects_empty_directories() {
        let text = "[db]\npath = \"x.sqlite\"\n\n[sources]\ndirectories = []\n";
        assert!(parse_config(text).is_err());
    }

    #[test]
    fn expand_home_only_touches_tilde() {
        assert_eq!(expand_home(Path::new("/abs/path")), PathBuf::from("/abs/path"));
        assert_eq!(expand_home(Path::new("rel")), PathBuf::from("rel"));
    }
}
