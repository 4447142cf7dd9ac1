//! # Repository Module
//!
//! Typed access to the whole-collection store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Command                                                               │
//! │       │  db.products().list().await?                                   │
//! │       ▼                                                                 │
//! │  Collection<Product>  (key "products", defaults = seed catalog)        │
//! │  ├── list()              strict: corrupt value → DbError::Corrupt      │
//! │  ├── list_or_default()   display: corrupt/unreadable → defaults + warn │
//! │  ├── append(record)      list + push + replace_all                     │
//! │  └── replace_all(records)                                              │
//! │       │  JSON array                                                     │
//! │       ▼                                                                 │
//! │  dyn KeyValueStore (SQLite or memory)                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Strict vs Display Reads
//! A read that feeds a write must use [`Collection::list`]: falling back to
//! defaults there would overwrite the stored data with the seed list.
//! Screens that only show data use [`Collection::list_or_default`].
//!
//! ## Available Repositories
//!
//! - [`Collection`] - One JSON array under one key
//! - [`SessionStore`] - The logged-in user
//! - [`UnitOfWork`] - Stages several collections, commits them atomically

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use construflow_core::SessionUser;

use crate::error::{DbError, DbResult};
use crate::store::{keys, KeyValueStore};

pub mod unit_of_work;

pub use unit_of_work::UnitOfWork;

// =============================================================================
// Collection
// =============================================================================

/// One entity collection stored as a JSON array under `key`.
pub struct Collection<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    defaults: fn() -> Vec<T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Collection {
            store: Arc::clone(&self.store),
            key: self.key,
            defaults: self.defaults,
        }
    }
}

impl<T> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("key", &self.key).finish()
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str, defaults: fn() -> Vec<T>) -> Self {
        Collection {
            store,
            key,
            defaults,
        }
    }

    /// A collection whose absent key means "empty".
    pub fn empty_by_default(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Collection::new(store, key, Vec::new)
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Reads the collection.
    ///
    /// ## Returns
    /// * `Ok(defaults)` - the key was never written
    /// * `Ok(records)` - stored array decoded
    /// * `Err(DbError::Corrupt)` - stored text is not a valid array
    /// * `Err(_)` - the store failed
    pub async fn list(&self) -> DbResult<Vec<T>> {
        match self.store.get(self.key).await? {
            None => Ok((self.defaults)()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| DbError::corrupt(self.key, e)),
        }
    }

    /// Reads the collection for display, falling back to the defaults on
    /// any error.
    pub async fn list_or_default(&self) -> Vec<T> {
        match self.list().await {
            Ok(records) => records,
            Err(e) => {
                warn!(key = self.key, error = %e, "Falling back to default collection");
                (self.defaults)()
            }
        }
    }

    /// Replaces the whole stored collection.
    pub async fn replace_all(&self, records: &[T]) -> DbResult<()> {
        let raw = self.encode(records)?;
        debug!(key = self.key, count = records.len(), "Replacing collection");
        self.store.put(self.key, &raw).await
    }

    /// Appends one record and rewrites the collection.
    pub async fn append(&self, record: T) -> DbResult<()> {
        let mut records = self.list().await?;
        records.push(record);
        self.replace_all(&records).await
    }

    pub(crate) fn encode(&self, records: &[T]) -> DbResult<String> {
        serde_json::to_string(records).map_err(|e| DbError::Serialization(e.to_string()))
    }
}

// =============================================================================
// Session
// =============================================================================

/// The authenticated user, persisted under the `session` key.
#[derive(Debug, Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        SessionStore { store }
    }

    /// Returns the stored session, `None` when logged out.
    pub async fn get(&self) -> DbResult<Option<SessionUser>> {
        match self.store.get(keys::SESSION).await? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| DbError::corrupt(keys::SESSION, e)),
        }
    }

    pub async fn set(&self, user: &SessionUser) -> DbResult<()> {
        let raw = Self::encode(user)?;
        self.store.put(keys::SESSION, &raw).await
    }

    pub(crate) fn encode(user: &SessionUser) -> DbResult<String> {
        serde_json::to_string(user).map_err(|e| DbError::Serialization(e.to_string()))
    }

    pub async fn clear(&self) -> DbResult<()> {
        self.store.remove(keys::SESSION).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use construflow_core::UserProfile;

    fn seeded() -> Vec<String> {
        vec!["seed".to_string()]
    }

    fn setup() -> (Arc<MemoryStore>, Collection<String>) {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn KeyValueStore> = memory.clone();
        (memory, Collection::new(store, "things", seeded))
    }

    #[tokio::test]
    async fn test_absent_key_yields_defaults() {
        let (_, things) = setup();
        assert_eq!(things.list().await.unwrap(), vec!["seed"]);
    }

    #[tokio::test]
    async fn test_append_and_replace_all() {
        let (_, things) = setup();

        things.append("a".to_string()).await.unwrap();
        assert_eq!(things.list().await.unwrap(), vec!["seed", "a"]);

        things.replace_all(&[]).await.unwrap();
        // an empty stored array is not the same as an absent key
        assert!(things.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_value_strict_vs_display() {
        let (memory, things) = setup();
        memory.insert_raw("things", "{not an array").await;

        assert!(matches!(things.list().await, Err(DbError::Corrupt { .. })));
        assert_eq!(things.list_or_default().await, vec!["seed"]);

        // append must not paper over the corrupt value
        assert!(things.append("x".to_string()).await.is_err());
        assert_eq!(
            memory.get("things").await.unwrap().as_deref(),
            Some("{not an array")
        );
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let memory: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session = SessionStore::new(memory);
        assert_eq!(session.get().await.unwrap(), None);

        let user = SessionUser {
            id: "u1".to_string(),
            name: "Admin".to_string(),
            login: "admin".to_string(),
            profile: UserProfile::Admin,
        };
        session.set(&user).await.unwrap();
        assert_eq!(session.get().await.unwrap(), Some(user));

        session.clear().await.unwrap();
        assert_eq!(session.get().await.unwrap(), None);
    }
}
