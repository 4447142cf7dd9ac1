//! # Commands Module
//!
//! Every operation the back office exposes. Commands are plain async
//! functions over the state types, so any front end (the bundled CLI, a
//! desktop shell, an HTTP layer) can call them.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── auth.rs       ◄─── Startup route, setup, login, logout
//! ├── cart.rs       ◄─── Cart manipulation, measured products
//! ├── sale.rs       ◄─── Checkout and sale history
//! ├── catalog.rs    ◄─── Product/client search and registration
//! ├── inventory.rs  ◄─── Stock filter and adjustment
//! ├── finance.rs    ◄─── Ledger, summary, manual entries
//! ├── dashboard.rs  ◄─── Headline metrics
//! └── config.rs     ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Front end (CLI subcommand, button click)                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  pub async fn add_to_cart(                                              │
//! │      db: &DbState,            ◄── only the state it needs              │
//! │      cart: &CartState,                                                  │
//! │      product_id: &str,        ◄── parsed input                         │
//! │      quantity: Option<Quantity>,                                        │
//! │  ) -> ApiResult<CartResponse>                                           │
//! │         │                                                               │
//! │         │ (Serialize)                                                   │
//! │         ▼                                                               │
//! │  Front end renders the response or `ApiError { code, message }`        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Injection
//! ```rust,ignore
//! // Only needs database
//! async fn search_products(db: &DbState, query: &str)
//!
//! // Only needs cart
//! fn get_cart(cart: &CartState)
//!
//! // Needs both
//! async fn add_to_cart(db: &DbState, cart: &CartState, ...)
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod finance;
pub mod inventory;
pub mod sale;
