//! SQLite-backed [`ChangeTracker`].
//!
//! One row per indexed file in `vectorized_files`, keyed by file id.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use ragclip_core::models::FileRecord;
use ragclip_core::tracker::ChangeTracker;

pub struct SqliteTracker {
    pool: SqlitePool,
}

impl SqliteTracker {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> FileRecord {
    FileRecord {
        file_id: row.get("file_id"),
        content_hash: row.get("hash"),
        chunk_count: row.get("chunk_count"),
        indexed_at: row.get("indexed_at"),
    }
}

#[async_trait]
impl ChangeTracker for SqliteTracker {
    async fn is_vectorized(&self, file_id: &str, hash: &str) -> Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM vectorized_files WHERE file_id = ? AND hash = ?")
                .bind(file_id)
                .bind(hash)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    async fn record(&self, file_id: &str, hash: &str, chunk_count: i64) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO vectorized_files (file_id, hash, chunk_count, indexed_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(file_id) DO UPDATE SET
                hash = excluded.hash,
                chunk_count = excluded.chunk_count,
                indexed_at = excluded.indexed_at
            "#,
        )
        .bind(file_id)
        .bind(hash)
        .bind(chunk_count)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn forget(&self, file_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM vectorized_files WHERE file_id = ?")
            .bind(file_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>> {
        let row = sqlx::query(
            "SELECT file_id, hash, chunk_count, indexed_at FROM vectorized_files WHERE file_id = ?",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_record))
    }

    async fn list(&self) -> Result<Vec<FileRecord>> {
        let rows = sqlx::query(
            "SELECT file_id, hash, chunk_count, indexed_at FROM vectorized_files ORDER BY file_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, migrate};
    use tempfile::TempDir;

    async fn tracker(tmp: &TempDir) -> SqliteTracker {
        let pool = db::connect_path(&tmp.path().join("t.sqlite")).await.unwrap();
        migrate::run_migrations(&pool).await.unwrap();
        SqliteTracker::new(pool)
    }

    #[tokio::test]
    async fn exact_pair_lookup() {
        let tmp = TempDir::new().unwrap();
        let t = tracker(&tmp).await;

        assert!(!t.is_vectorized("/a.txt", "h1").await.unwrap());
        t.record("/a.txt", "h1", 4).await.unwrap();
        assert!(t.is_vectorized("/a.txt", "h1").await.unwrap());
        assert!(!t.is_vectorized("/a.txt", "h2").await.unwrap());

        t.forget("/a.txt").await.unwrap();
        assert!(!t.is_vectorized("/a.txt", "h1").await.unwrap());
        assert!(t.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_replaces_hash_and_persists() {
        let tmp = TempDir::new().unwrap();
        {
            let t = tracker(&tmp).await;
            t.record("/b.txt", "h1", 1).await.unwrap();
            t.record("/a.txt", "h1", 2).await.unwrap();
            t.record("/b.txt", "h2", 3).await.unwrap();
            t.pool.close().await;
        }

        let t = tracker(&tmp).await;
        let all = t.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].file_id, "/a.txt");
        let b = t.get("/b.txt").await.unwrap().unwrap();
        assert_eq!(b.content_hash, "h2");
        assert_eq!(b.chunk_count, 3);
        assert!(b.indexed_at > 0);
    }
}
