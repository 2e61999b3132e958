//! # cr-store-sqlite Implementation
//!
//! `KeyValueStore` over a single SQLite table. Each key is one row; a put is
//! one UPSERT statement, so a failed write never leaves half a blob behind.

use std::str::FromStr;

use async_trait::async_trait;
use cr_core::traits::KeyValueStore;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    /// Opens (creating if needed) the database at `url` and ensures the schema.
    ///
    /// In-memory databases are per connection, so `sqlite::memory:` gets a
    /// single-connection pool.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let max_connections = if url.contains(":memory:") { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        log::info!("sqlite store ready at {url}");
        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cr_core::{AggregatorConfig, Location, ReportStore, Submission, POSTS_KEY};

    #[tokio::test]
    async fn test_get_put_in_memory() {
        let store = SqliteKvStore::new("sqlite::memory:").await.unwrap();

        assert_eq!(store.get(POSTS_KEY).await.unwrap(), None);
        store.put(POSTS_KEY, "[]").await.unwrap();
        store.put(POSTS_KEY, "[{}]").await.unwrap();
        assert_eq!(store.get(POSTS_KEY).await.unwrap().as_deref(), Some("[{}]"));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_reports_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("reports.db").display());
        let submission = Submission {
            location: Some(Location::new(22.72, 75.85).into()),
            tags: Some("garbage".into()),
            caption: "Overflowing bin".into(),
            ..Default::default()
        };

        let first = ReportStore::new(
            Box::new(SqliteKvStore::new(&url).await.unwrap()),
            AggregatorConfig::default(),
        )
        .unwrap();
        let (_, created) = first.submit(submission).await.unwrap();

        let reopened = ReportStore::new(
            Box::new(SqliteKvStore::new(&url).await.unwrap()),
            AggregatorConfig::default(),
        )
        .unwrap();
        assert_eq!(reopened.get(created.id).await.unwrap(), created);
    }
}
