//! # Database State
//!
//! Wraps the `Database` handle for use in commands.
//!
//! ## Thread Safety
//! `Database` holds an `Arc<dyn KeyValueStore>`; the SQLite backend pools
//! its connections and the memory backend locks internally, so commands
//! share it without extra locking.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn list_suppliers(db: &DbState) -> ApiResult<Vec<Supplier>> {
//!     Ok(db.inner().suppliers().list_or_default().await)
//! }
//! ```

use construflow_db::Database;

/// Wrapper around `Database` for state management.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
