//! Save-game storage.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::infrastructure::ports::{ClockPort, RepoError, SaveStore};

/// The single save slot used by the engine.
const SAVE_SLOT: &str = "solterra_save";

/// SQLite implementation holding the save blob in one row.
pub struct SqliteSaveStore {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteSaveStore {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("save_store", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS save_state (
                slot TEXT PRIMARY KEY NOT NULL,
                blob TEXT NOT NULL,
                saved_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("save_store", e))?;

        Ok(Self { pool, clock })
    }
}

#[async_trait]
impl SaveStore for SqliteSaveStore {
    async fn save(&self, blob: &str) -> Result<(), RepoError> {
        let now = self.clock.now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO save_state (slot, blob, saved_at)
            VALUES (?, ?, ?)
            ON CONFLICT(slot) DO UPDATE SET
                blob = excluded.blob,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(SAVE_SLOT)
        .bind(blob)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_store", e))?;

        Ok(())
    }

    async fn load(&self) -> Result<Option<String>, RepoError> {
        let row = sqlx::query("SELECT blob FROM save_state WHERE slot = ?")
            .bind(SAVE_SLOT)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("save_store", e))?;

        Ok(row.map(|row| row.get::<String, _>("blob")))
    }
}

/// Volatile store for tests and runs without a database.
#[derive(Default)]
pub struct InMemorySaveStore {
    blob: RwLock<Option<String>>,
}

impl InMemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SaveStore for InMemorySaveStore {
    async fn save(&self, blob: &str) -> Result<(), RepoError> {
        *self.blob.write().await = Some(blob.to_string());
        Ok(())
    }

    async fn load(&self) -> Result<Option<String>, RepoError> {
        Ok(self.blob.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;

    #[tokio::test]
    async fn sqlite_store_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.db");
        let store = SqliteSaveStore::new(path.to_str().unwrap(), Arc::new(SystemClock))
            .await
            .unwrap();

        assert_eq!(store.load().await.unwrap(), None);
        store.save("{\"chapter\":1}").await.unwrap();
        store.save("{\"chapter\":2}").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("{\"chapter\":2}"));
    }

    #[tokio::test]
    async fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.db");
        let path = path.to_str().unwrap();
        {
            let store = SqliteSaveStore::new(path, Arc::new(SystemClock)).await.unwrap();
            store.save("persisted").await.unwrap();
        }
        let reopened = SqliteSaveStore::new(path, Arc::new(SystemClock)).await.unwrap();
        assert_eq!(reopened.load().await.unwrap().as_deref(), Some("persisted"));
    }

    #[tokio::test]
    async fn in_memory_store_starts_empty() {
        let store = InMemorySaveStore::new();
        assert_eq!(store.load().await.unwrap(), None);
        store.save("x").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("x"));
    }
}
