//! # ragclip Core
//!
//! Runtime-agnostic logic for ragclip: data models, text normalization,
//! sliding-window chunking, the change-tracker and vector-store traits,
//! the incremental indexing step, and prompt assembly for retrieval.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or clipboard
//! access. The `ragclip` application crate supplies the concrete
//! backends and drives the pipelines.
//!
//! ## Data Flow
//!
//! ```text
//! raw text ─▶ normalize ─▶ hash ─▶ ChangeTracker? ─▶ chunk ─▶ VectorStore
//!                                                                │
//! query ─────────────────────────────────────────▶ query(top_k) ─┘
//!                                                      │
//!                                                      ▼
//!                                               prompt template
//! ```

pub mod chunk;
pub mod index;
pub mod models;
pub mod normalize;
pub mod prompt;
pub mod retrieve;
pub mod store;
pub mod tracker;
