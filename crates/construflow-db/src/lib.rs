//! # construflow-db: Storage Layer for the ConstruFlow Back Office
//!
//! Every entity list is persisted as one JSON array under its own key.
//! Reads fetch a whole collection, writes replace it; a checkout touches
//! three collections and commits them in a single transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ConstruFlow Data Flow                               │
//! │                                                                         │
//! │  backoffice command (finish_sale)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  construflow-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │   │
//! │  │   │   Database    │   │  Repositories  │   │    Store      │   │   │
//! │  │   │   (pool.rs)   │──►│ Collection<T>  │──►│ KeyValueStore │   │   │
//! │  │   │               │   │ SessionStore   │   │ ├ SqliteStore │   │   │
//! │  │   │ DbConfig      │   │ UnitOfWork     │   │ └ MemoryStore │   │   │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite: kv_store(key, value, updated_at)                       │   │
//! │  │  <data dir>/construflow.db                                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Configuration, connection pool, the [`Database`] handle
//! - [`store`] - Key/value backends
//! - [`repository`] - Typed collections, session, unit of work
//! - [`migrations`] - Embedded migrations
//! - [`seed`] - Seed catalog, clients and suppliers
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use construflow_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("construflow.db")).await?;
//! let products = db.products().list().await?;
//! db.commit_settlement(&settlement).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{Collection, SessionStore, UnitOfWork};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
