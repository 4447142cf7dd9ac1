//! # In-Memory Store
//!
//! HashMap-backed [`KeyValueStore`] for tests.
//!
//! Two hooks let tests exercise the unhappy paths:
//! - [`MemoryStore::fail_writes`] makes every write return
//!   [`DbError::WriteFailed`] without storing anything
//! - [`MemoryStore::insert_raw`] stores arbitrary text, e.g. a corrupt
//!   collection, bypassing the failure switch

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::error::{DbError, DbResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Makes every subsequent write fail until switched off again.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }

    pub async fn key_count(&self) -> usize {
        self.entries.read().await.len()
    }

    fn check_writable(&self) -> DbResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DbError::WriteFailed("store is rejecting writes".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        self.check_writable()?;
        self.insert_raw(key, value).await;
        Ok(())
    }

    async fn put_many(&self, entries: &[(String, String)]) -> DbResult<()> {
        self.check_writable()?;

        let mut map = self.entries.write().await;
        for (key, value) in entries {
            map.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        self.check_writable()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> DbResult<Vec<String>> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn reset_to(&self, entries: &[(String, String)]) -> DbResult<()> {
        self.check_writable()?;
        *self.entries.write().await = entries.iter().cloned().collect();
        Ok(())
    }
}
