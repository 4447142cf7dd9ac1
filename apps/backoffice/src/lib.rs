//! # ConstruFlow Back Office Library
//!
//! Commands and state for the ConstruFlow back office, plus the CLI that
//! drives them.
//!
//! ## Module Organization
//! ```text
//! construflow_backoffice/
//! ├── lib.rs          ◄─── You are here (startup, logging, database path)
//! ├── cli.rs          ◄─── clap front end
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── cart.rs     ◄─── Sale draft (cart, client, payment method)
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/
//! │   ├── auth.rs     ◄─── Setup, login, logout
//! │   ├── cart.rs     ◄─── Cart manipulation
//! │   ├── sale.rs     ◄─── Checkout
//! │   ├── catalog.rs  ◄─── Products, clients, suppliers
//! │   ├── inventory.rs◄─── Stock filter and adjustment
//! │   ├── finance.rs  ◄─── Ledger
//! │   ├── dashboard.rs◄─── Headline metrics
//! │   └── config.rs   ◄─── Configuration retrieval
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use directories::ProjectDirs;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use construflow_db::{Database, DbConfig};

use cli::Cli;
use state::{CartState, ConfigState, DbState};

/// Runs the CLI.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Parse Arguments ──────────────────────────────────────────────────► │
/// │     • clap derive, `--db` also from CONSTRUFLOW_DB_PATH                 │
/// │                                                                         │
/// │  2. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info,construflow=debug,sqlx=warn (override: RUST_LOG)    │
/// │                                                                         │
/// │  3. Determine Database Path ──────────────────────────────────────────► │
/// │     • --db / CONSTRUFLOW_DB_PATH, else the platform data directory      │
/// │                                                                         │
/// │  4. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  5. Initialize State Objects ─────────────────────────────────────────► │
/// │     • DbState, CartState, ConfigState::from_env()                       │
/// │                                                                         │
/// │  6. Execute the subcommand ───────────────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let db_path = match database_path(cli.db.clone()) {
        Ok(path) => path,
        Err(e) => {
            error!("Could not determine database path: {}", e);
            eprintln!("error: could not determine database path: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(?db_path, "Database path determined");

    let db = match Database::new(DbConfig::new(db_path)).await {
        Ok(db) => db,
        Err(e) => {
            error!("Database initialization failed: {}", e);
            eprintln!("error: could not open the database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let db_state = DbState::new(db);
    let cart_state = CartState::new();
    let config_state = ConfigState::from_env();

    let result = cli::execute(cli.command, &db_state, &cart_state, &config_state, cli.json).await;
    db_state.inner().close().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                match serde_json::to_string_pretty(&e) {
                    Ok(rendered) => eprintln!("{}", rendered),
                    Err(_) => eprintln!("{}", e),
                }
            } else {
                eprintln!("error: {}", e.message);
            }
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=construflow_db=trace` - Trace the storage layer only
/// - Default: `info,construflow=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,construflow=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.construflow.erp/construflow.db`
/// - **Windows**: `%APPDATA%\construflow\erp\data\construflow.db`
/// - **Linux**: `~/.local/share/erp/construflow.db`
///
/// An explicit path (`--db` or `CONSTRUFLOW_DB_PATH`) wins.
pub fn database_path(explicit: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let proj_dirs = ProjectDirs::from("com", "construflow", "erp")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("construflow.db"))
}
