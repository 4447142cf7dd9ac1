//! # State Module
//!
//! Application state shared by the back office commands.
//!
//! Each concern gets its own state type, and commands take exactly the
//! states they need:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      CLI / front end                            │   │
//! │  │  let db = DbState::new(Database::new(config).await?);           │   │
//! │  │  let cart = CartState::new();                                   │   │
//! │  │  let config = ConfigState::from_env();                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │   DbState    │  │  CartState   │  │   ConfigState    │              │
//! │  │              │  │              │  │                  │              │
//! │  │  Database    │  │  Arc<Mutex<  │  │  store_name      │              │
//! │  │  (collection │  │   SaleDraft  │  │  currency_symbol │              │
//! │  │   store)     │  │  >>          │  │  low_stock_prev. │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: the store backend is Send + Sync behind an Arc             │
//! │  • CartState: Protected by Arc<Mutex<T>> for exclusive access          │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod db;

pub use cart::{CartState, SaleDraft};
pub use config::ConfigState;
pub use db::DbState;
