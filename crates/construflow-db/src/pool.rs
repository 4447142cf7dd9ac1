//! # Database Handle
//!
//! Pool creation, backend selection and repository access.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Handle                                    │
//! │                                                                         │
//! │  App startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────┐                                  │
//! │  │  Arc<dyn KeyValueStore>          │                                  │
//! │  │   ├── SqliteStore (file, WAL)    │  production                      │
//! │  │   └── MemoryStore                │  tests                           │
//! │  └──────────────────────────────────┘                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.products() / db.sales() / db.ledger() / db.session() / ...         │
//! │  db.commit_settlement(&settlement)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File databases use WAL journaling with NORMAL synchronous. This does not
//! make concurrent writers safe: see the [`crate::store`] module docs.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use construflow_core::{Client, LedgerRecord, Product, Sale, Settlement, Supplier, User};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::{Collection, SessionStore, UnitOfWork};
use crate::seed;
use crate::store::{keys, KeyValueStore, MemoryStore, SqliteStore};

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/construflow.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// An in-memory SQLite database (for testing).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

/// Opens the pool described by `config` and runs migrations if enabled.
pub async fn connect(config: &DbConfig) -> DbResult<SqlitePool> {
    info!(
        path = %config.database_path.display(),
        "Initializing database connection"
    );

    let connect_options = if config.is_in_memory() {
        SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
    } else {
        SqliteConnectOptions::new()
            .filename(&config.database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
    };

    debug!("Connection options configured");

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .connect_with(connect_options)
        .await
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

    info!(
        max_connections = config.max_connections,
        "Database pool created"
    );

    if config.run_migrations {
        migrations::run_migrations(&pool).await?;
    }

    Ok(pool)
}

// =============================================================================
// Database
// =============================================================================

/// Main storage handle providing repository access.
///
/// Cheap to clone: every clone shares the same backend.
#[derive(Debug, Clone)]
pub struct Database {
    store: Arc<dyn KeyValueStore>,
}

impl Database {
    /// Opens (creating if needed) the SQLite database described by `config`.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let pool = connect(&config).await?;
        Ok(Database::with_store(Arc::new(SqliteStore::new(pool))))
    }

    /// Uses an existing backend, e.g. a shared [`MemoryStore`] in tests.
    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        Database { store }
    }

    /// A fresh, empty in-memory database.
    pub fn in_memory() -> Self {
        Database::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    // -------------------------------------------------------------------------
    // Repositories
    // -------------------------------------------------------------------------

    pub fn products(&self) -> Collection<Product> {
        Collection::new(self.store.clone(), keys::PRODUCTS, seed::products)
    }

    pub fn clients(&self) -> Collection<Client> {
        Collection::new(self.store.clone(), keys::CLIENTS, seed::clients)
    }

    pub fn suppliers(&self) -> Collection<Supplier> {
        Collection::new(self.store.clone(), keys::SUPPLIERS, seed::suppliers)
    }

    pub fn sales(&self) -> Collection<Sale> {
        Collection::empty_by_default(self.store.clone(), keys::SALES)
    }

    /// The finance ledger (`finance` key).
    pub fn ledger(&self) -> Collection<LedgerRecord> {
        Collection::empty_by_default(self.store.clone(), keys::FINANCE)
    }

    pub fn users(&self) -> Collection<User> {
        Collection::empty_by_default(self.store.clone(), keys::USERS)
    }

    pub fn session(&self) -> SessionStore {
        SessionStore::new(self.store.clone())
    }

    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(self.store.clone())
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Persists a checkout: appends the sale, decrements stock and appends
    /// the ledger record, all in one atomic batch.
    ///
    /// ## Flow
    /// ```text
    /// strict read sales, products, ledger ──► any error? abort, nothing written
    ///        │
    ///        ▼
    /// push sale · apply stock deltas · push ledger record
    ///        │
    ///        ▼
    /// unit of work commit ──► error? nothing written
    /// ```
    pub async fn commit_settlement(&self, settlement: &Settlement) -> DbResult<()> {
        let sales_repo = self.sales();
        let products_repo = self.products();
        let ledger_repo = self.ledger();

        let mut sales = sales_repo.list().await?;
        let mut products = products_repo.list().await?;
        let mut ledger = ledger_repo.list().await?;

        sales.push(settlement.sale.clone());
        let adjusted = settlement.apply_to_stock(&mut products);
        ledger.push(settlement.ledger_record.clone());

        let mut uow = self.unit_of_work();
        uow.stage(&sales_repo, &sales)?;
        uow.stage(&products_repo, &products)?;
        uow.stage(&ledger_repo, &ledger)?;
        uow.commit().await?;

        info!(
            sale_id = %settlement.sale.id,
            total = settlement.sale.total.cents(),
            products_adjusted = adjusted,
            "Settlement committed"
        );
        Ok(())
    }

    /// Wipes every key and writes the seed catalog, clients and suppliers
    /// plus empty sales and ledger. Users are left empty.
    ///
    /// The wipe and the seed write are one batch: a failure leaves the
    /// previous contents in place.
    pub async fn reset_to_seed(&self) -> DbResult<()> {
        let mut uow = self.unit_of_work();
        uow.stage(&self.products(), &seed::products())?;
        uow.stage(&self.clients(), &seed::clients())?;
        uow.stage(&self.suppliers(), &seed::suppliers())?;
        uow.stage(&self.sales(), &[])?;
        uow.stage(&self.ledger(), &[])?;
        uow.commit_replacing_all().await?;

        info!("Store reset to seed data");
        Ok(())
    }

    /// Collection keys that have been written at least once.
    pub async fn written_collections(&self) -> DbResult<Vec<String>> {
        let stored = self.store.keys().await?;
        Ok(stored
            .into_iter()
            .filter(|k| keys::COLLECTIONS.contains(&k.as_str()))
            .collect())
    }

    pub async fn close(&self) {
        info!("Closing database");
        self.store.close().await;
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use construflow_core::{Cart, LedgerStatus, PaymentMethod, Quantity};

    async fn checkout(db: &Database, qty: i64, method: PaymentMethod) -> Settlement {
        let products = db.products().list().await.unwrap();
        let clients = db.clients().list().await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(&products[0], Quantity::from_whole(qty)).unwrap();
        Settlement::prepare(&cart, clients.get(1), method, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_sqlite_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        // absent keys read as seed data
        assert_eq!(db.products().list().await.unwrap().len(), 3);
        assert!(db.users().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_commit_settlement() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settlement = checkout(&db, 8, PaymentMethod::Fiado).await;

        db.commit_settlement(&settlement).await.unwrap();

        let sales = db.sales().list().await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].id, settlement.sale.id);

        let products = db.products().list().await.unwrap();
        assert_eq!(products[0].current_stock, Quantity::from_whole(142));
        assert_eq!(products[1].current_stock, Quantity::from_milli(200_500));

        let ledger = db.ledger().list().await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].status, LedgerStatus::Pending);
        assert_eq!(ledger[0].reference_id.as_deref(), Some(sales[0].id.as_str()));
    }

    #[tokio::test]
    async fn test_failed_settlement_changes_nothing() {
        let memory = Arc::new(MemoryStore::new());
        let db = Database::with_store(memory.clone());
        db.reset_to_seed().await.unwrap();
        let before = db.products().list().await.unwrap();

        let settlement = checkout(&db, 2, PaymentMethod::Cash).await;
        memory.fail_writes(true);

        assert!(matches!(
            db.commit_settlement(&settlement).await,
            Err(DbError::WriteFailed(_))
        ));

        memory.fail_writes(false);
        assert!(db.sales().list().await.unwrap().is_empty());
        assert!(db.ledger().list().await.unwrap().is_empty());
        assert_eq!(db.products().list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_corrupt_products_abort_settlement() {
        let memory = Arc::new(MemoryStore::new());
        let db = Database::with_store(memory.clone());
        let settlement = checkout(&db, 1, PaymentMethod::Pix).await;

        memory.insert_raw(keys::PRODUCTS, "[{\"id\":").await;

        assert!(matches!(
            db.commit_settlement(&settlement).await,
            Err(DbError::Corrupt { .. })
        ));
        assert!(db.sales().list().await.unwrap().is_empty());
        assert_eq!(
            memory.get(keys::PRODUCTS).await.unwrap().as_deref(),
            Some("[{\"id\":")
        );
    }

    #[tokio::test]
    async fn test_failed_reset_keeps_previous_data() {
        let memory = Arc::new(MemoryStore::new());
        let db = Database::with_store(memory.clone());
        let settlement = checkout(&db, 1, PaymentMethod::Cash).await;
        db.commit_settlement(&settlement).await.unwrap();

        memory.fail_writes(true);
        assert!(matches!(db.reset_to_seed().await, Err(DbError::WriteFailed(_))));
        memory.fail_writes(false);

        assert_eq!(db.sales().list().await.unwrap().len(), 1);
        assert_eq!(db.ledger().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_to_seed() {
        let db = Database::in_memory();
        assert!(db.written_collections().await.unwrap().is_empty());

        db.sales().replace_all(&[]).await.unwrap();
        db.reset_to_seed().await.unwrap();

        let mut written = db.written_collections().await.unwrap();
        written.sort();
        assert_eq!(written, vec!["clients", "finance", "products", "sales", "suppliers"]);
        assert_eq!(db.clients().list().await.unwrap().len(), 2);
    }
}
