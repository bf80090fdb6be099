//! # ragclip
//!
//! **A clipboard-driven retrieval helper for local documents.**
//!
//! ragclip keeps a searchable index of the text files, PDFs, Word and
//! Excel documents and saved web pages in a few directories. Copy a
//! question, run `ragclip ask` (typically bound to a global hotkey), and
//! the clipboard is replaced by a prompt that carries the most relevant
//! passages, ready to paste into any chat assistant.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────────┐
//! │ Source dirs  │──▶│ Extract +   │──▶│ VectorStore      │
//! │ txt/pdf/...  │   │ hash/chunk  │   │ sqlite | chroma  │
//! └──────────────┘   └──────┬──────┘   └────────┬─────────┘
//!                           ▼                   │
//!                  ┌─────────────────┐          │
//!                  │ vectorized_files│          │
//!                  │ (ChangeTracker) │          │
//!                  └─────────────────┘          ▼
//!        clipboard question ──────────▶ top-k ──▶ prompt ──▶ clipboard
//! ```
//!
//! ## Data Flow
//!
//! 1. [`scan`] lists the allowed files in the configured directories.
//! 2. [`extract`] turns each file into plain text (failures count as empty).
//! 3. The core indexer hashes the normalized text and, only when the hash
//!    changed, replaces the file's chunks in the vector store and records
//!    the hash in the [`tracker`].
//! 4. [`ask`] reads the clipboard, retrieves the nearest chunks and writes
//!    the assembled prompt back.
//! 5. [`listen`] runs the same commands from a long-lived dispatch loop.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`app`] | Owned store, tracker and clipboard handles |
//! | [`ask`] | Retrieval pipeline |
//! | [`chroma`] | Chroma v2 REST vector store |
//! | [`clipboard`] | System and in-memory clipboards |
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool |
//! | [`extract`] | PDF / DOCX / XLSX / HTML / text extraction |
//! | [`ingest`] | Indexing pass orchestration |
//! | [`listen`] | Command dispatch loop |
//! | [`migrate`] | Database schema |
//! | [`progress`] | Index progress on stderr |
//! | [`scan`] | Source directory walking |
//! | [`sqlite_store`] | FTS5-backed local vector store |
//! | [`status`] | Tracker summary |
//! | [`tracker`] | SQLite change tracker |

pub mod app;
pub mod ask;
pub mod chroma;
pub mod clipboard;
pub mod config;
pub mod db;
pub mod extract;
pub mod ingest;
pub mod listen;
pub mod migrate;
pub mod progress;
pub mod scan;
pub mod sqlite_store;
pub mod status;
pub mod tracker;
