//! # Key/Value Store
//!
//! The single persistence seam: string keys mapped to JSON text.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  key          value                                                     │
//! │  ───────────  ──────────────────────────────────────────────────────    │
//! │  users        User[]                                                    │
//! │  products     Product[]       (absent → seed catalog)                   │
//! │  clients      Client[]        (absent → seed clients)                   │
//! │  suppliers    Supplier[]      (absent → seed suppliers)                 │
//! │  sales        Sale[]                                                    │
//! │  finance      LedgerRecord[]                                            │
//! │  session      SessionUser     (absent → logged out)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! There is no version token on a key. Two processes writing the same key
//! are last-write-wins at whole-collection granularity, so a database file
//! must only be opened by one writer at a time. [`KeyValueStore::put_many`]
//! makes a batch atomic inside one process; it does not isolate processes
//! from each other.
//!
//! ## Backends
//! - [`SqliteStore`] - `kv_store` table in a SQLite file
//! - [`MemoryStore`] - HashMap for tests, with failure injection

use async_trait::async_trait;

use crate::error::DbResult;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage keys.
pub mod keys {
    pub const USERS: &str = "users";
    pub const PRODUCTS: &str = "products";
    pub const CLIENTS: &str = "clients";
    pub const SUPPLIERS: &str = "suppliers";
    pub const SALES: &str = "sales";
    pub const FINANCE: &str = "finance";
    pub const SESSION: &str = "session";

    /// Every collection key, in the order the seed tool writes them.
    pub const COLLECTIONS: [&str; 6] = [USERS, PRODUCTS, CLIENTS, SUPPLIERS, SALES, FINANCE];
}

/// A string-keyed store of JSON documents.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Returns the raw value, or `None` when the key was never written.
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Inserts or replaces one value.
    async fn put(&self, key: &str, value: &str) -> DbResult<()>;

    /// Inserts or replaces several values atomically: either every entry
    /// is stored or none is.
    async fn put_many(&self, entries: &[(String, String)]) -> DbResult<()>;

    /// Deletes a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> DbResult<()>;

    /// All stored keys, sorted.
    async fn keys(&self) -> DbResult<Vec<String>>;

    /// Deletes every key and stores `entries`, atomically: on error the
    /// previous contents are untouched.
    async fn reset_to(&self, entries: &[(String, String)]) -> DbResult<()>;

    /// Whether the backend answers at all.
    async fn health_check(&self) -> bool {
        true
    }

    /// Releases backend resources. Later calls may fail.
    async fn close(&self) {}
}
