//! # SQLite Store
//!
//! [`KeyValueStore`] over the `kv_store` table.
//!
//! ## Batch Writes
//! ```text
//! put_many([(sales, ..), (products, ..), (finance, ..)])
//!      │
//!      ▼
//!  BEGIN
//!   ├── UPSERT sales
//!   ├── UPSERT products
//!   └── UPSERT finance
//!  COMMIT   (any error → ROLLBACK when the transaction is dropped)
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, error};

use super::KeyValueStore;
use crate::error::{DbError, DbResult};

const UPSERT: &str = r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wraps a pool whose migrations have already run.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, bytes = value.len(), "Writing key");

        sqlx::query(UPSERT)
            .bind(key)
            .bind(value)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn put_many(&self, entries: &[(String, String)]) -> DbResult<()> {
        debug!(count = entries.len(), "Writing batch");

        let mut tx = self.pool.begin().await?;
        upsert_all(&mut tx, entries).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }

    async fn reset_to(&self, entries: &[(String, String)]) -> DbResult<()> {
        debug!(count = entries.len(), "Resetting store");

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM kv_store").execute(&mut *tx).await?;
        upsert_all(&mut tx, entries).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Upserts every entry inside `tx`. The caller commits.
async fn upsert_all(
    tx: &mut Transaction<'_, Sqlite>,
    entries: &[(String, String)],
) -> DbResult<()> {
    let now = Utc::now().to_rfc3339();

    for (key, value) in entries {
        sqlx::query(UPSERT)
            .bind(key.as_str())
            .bind(value.as_str())
            .bind(now.as_str())
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                error!(key = %key, error = %e, "Batch write failed, rolling back");
                DbError::WriteFailed(e.to_string())
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{connect, DbConfig};

    async fn store() -> SqliteStore {
        SqliteStore::new(connect(&DbConfig::in_memory()).await.unwrap())
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = store().await;
        assert_eq!(store.get("products").await.unwrap(), None);

        store.put("products", "[]").await.unwrap();
        store.put("products", "[1]").await.unwrap();
        assert_eq!(store.get("products").await.unwrap().as_deref(), Some("[1]"));

        store.remove("products").await.unwrap();
        store.remove("products").await.unwrap();
        assert_eq!(store.get("products").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_many_and_keys() {
        let store = store().await;
        store
            .put_many(&[
                ("sales".to_string(), "[]".to_string()),
                ("finance".to_string(), "[]".to_string()),
            ])
            .await
            .unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["finance", "sales"]);

        store.reset_to(&[]).await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
        assert!(store.health_check().await);
    }

    #[tokio::test]
    async fn test_reset_to_replaces_everything() {
        let store = store().await;
        store.put("session", "{}").await.unwrap();
        store.put("sales", "[1]").await.unwrap();

        store
            .reset_to(&[("sales".to_string(), "[]".to_string())])
            .await
            .unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["sales"]);
        assert_eq!(store.get("sales").await.unwrap().as_deref(), Some("[]"));
    }
}
