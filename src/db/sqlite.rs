use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tracing::{debug, info};

use super::Storage;
use crate::error::StorageError;

const MAX_CONNECTIONS: u32 = 5;

/// SQLite-backed key/value store for tracker documents
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open the tracker database, creating the file and its directory on first run
    pub async fn new(database_url: &str) -> Result<Self> {
        if let Some(dir) = database_dir(database_url) {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL '{}'", database_url))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .context("Failed to open tracker database")?;

        let store = Self { pool };
        store.init_schema().await?;

        info!("Tracker database ready at {}", database_url);
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create documents table")?;

        Ok(())
    }

    /// When a key was last saved, as an RFC 3339 string
    pub async fn updated_at(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT updated_at FROM documents WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| r.0))
    }
}

#[async_trait]
impl Storage for SqliteStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT key, value, updated_at FROM documents
            WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                debug!("Loaded '{}' (saved {})", row.key, row.updated_at);
                Ok(Some(serde_json::from_str(&row.value)?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let text = serde_json::to_string(&value)?;

        sqlx::query(
            r#"
            INSERT INTO documents (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&text)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!("Saved '{}' ({} bytes)", key, text.len());
        Ok(())
    }
}

/// Directory a file-backed database lives in, if it needs creating
fn database_dir(database_url: &str) -> Option<PathBuf> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or_default();

    if path.is_empty() || path == ":memory:" {
        return None;
    }

    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Database row representation
#[derive(sqlx::FromRow)]
struct DocumentRow {
    key: String,
    value: String,
    updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("tracker.db").display());
        let store = SqliteStore::new(&url).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_key_loads_none() {
        let (_dir, store) = temp_store().await;

        assert!(store.load("matches").await.unwrap().is_none());
        assert!(store.updated_at("matches").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let (_dir, store) = temp_store().await;

        store
            .save("playerPanels", serde_json::json!([{ "id": "a" }]))
            .await
            .unwrap();
        store
            .save("playerPanels", serde_json::json!([{ "id": "b" }]))
            .await
            .unwrap();

        let loaded = store.load("playerPanels").await.unwrap().unwrap();
        assert_eq!(loaded, serde_json::json!([{ "id": "b" }]));
        assert!(store.updated_at("playerPanels").await.unwrap().is_some());
    }

    #[test]
    fn test_database_dir() {
        assert_eq!(
            database_dir("sqlite:data/tracker.db"),
            Some(PathBuf::from("data"))
        );
        assert_eq!(
            database_dir("sqlite:///var/lib/gaa/tracker.db?mode=rwc"),
            Some(PathBuf::from("/var/lib/gaa"))
        );
        assert_eq!(database_dir("sqlite:tracker.db"), None);
        assert_eq!(database_dir("sqlite::memory:"), None);
        assert_eq!(database_dir("postgres://localhost/gaa"), None);
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("tracker.db");
        let url = format!("sqlite:{}", path.display());

        let store = SqliteStore::new(&url).await.unwrap();
        store.save("k", serde_json::json!(1)).await.unwrap();

        assert!(path.exists());
    }
}
