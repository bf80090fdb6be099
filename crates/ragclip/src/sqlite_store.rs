//! SQLite-backed [`VectorStore`].
//!
//! The local default backend. Chunks are kept in the `chunks` table and
//! mirrored into the `chunks_fts` FTS5 index; queries rank with BM25 over
//! the query's terms. No embedding model is involved, which keeps the
//! tool usable offline.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use ragclip_core::models::{ChunkRecord, QueryMatch};
use ragclip_core::store::{query_terms, VectorStore};

pub struct SqliteVectorStore {
    pool: SqlitePool,
}

impl SqliteVectorStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// FTS5 match expression: every term quoted, any term may match.
fn match_expression(terms: &[String]) -> String {
    terms
        .iter()
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn upsert(&self, chunks: &[ChunkRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for chunk in chunks {
            sqlx::query(
                r#"
                INSERT INTO chunks (id, file_id, chunk_index, text) VALUES (?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    file_id = excluded.file_id,
                    chunk_index = excluded.chunk_index,
                    text = excluded.text
                "#,
            )
            .bind(&chunk.id)
            .bind(&chunk.file_id)
            .bind(chunk.chunk_index)
            .bind(&chunk.text)
            .execute(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM chunks_fts WHERE chunk_id = ?")
                .bind(&chunk.id)
                .execute(&mut *tx)
                .await?;

            sqlx::query("INSERT INTO chunks_fts (chunk_id, file_id, text) VALUES (?, ?, ?)")
                .bind(&chunk.id)
                .bind(&chunk.file_id)
                .bind(&chunk.text)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_file(&self, file_id: &str) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM chunks_fts WHERE file_id = ?")
            .bind(file_id)
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query("DELETE FROM chunks WHERE file_id = ?")
            .bind(file_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(removed)
    }

    async fn query(&self, query: &str, limit: usize) -> Result<Vec<QueryMatch>> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT chunk_id, file_id, text, rank
            FROM chunks_fts
            WHERE chunks_fts MATCH ?
            ORDER BY rank
            LIMIT ?
            "#,
        )
        .bind(match_expression(&terms))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let rank: f64 = row.get("rank");
                QueryMatch {
                    id: row.get("chunk_id"),
                    file_id: row.get("file_id"),
                    text: row.get("text"),
                    score: -rank,
                }
            })
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }
}
