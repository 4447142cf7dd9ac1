//! # construflow-core: Pure Business Logic for the ConstruFlow Back Office
//!
//! This crate holds every business rule of the store back office as pure
//! functions over in-memory values. Persistence lives in `construflow-db`,
//! orchestration in the `backoffice` app.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ConstruFlow Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              backoffice (commands, state, CLI)                  │   │
//! │  │   add_to_cart, finish_sale, add_manual_entry, dashboard, ...    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ construflow-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────────────────┐  │   │
//! │  │   │  types  │ │  cart   │ │ measure  │ │    settlement      │  │   │
//! │  │   │ Product │ │  Cart   │ │ L × W or │ │ Sale + stock delta │  │   │
//! │  │   │  Sale   │ │CartLine │ │ manual   │ │ + ledger record    │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └────────────────────┘  │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────────────────┐  │   │
//! │  │   │  money  │ │quantity │ │ finance  │ │ inventory/dashboard│  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └────────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          construflow-db (whole-collection snapshots)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Client, Sale, LedgerRecord, User)
//! - [`money`] - Money in integer cents
//! - [`quantity`] - Fixed-point quantities (thousandths) for m², m and kg
//! - [`cart`] - Cart accumulator
//! - [`measure`] - Quantity resolver for area/length products
//! - [`settlement`] - Turns a cart into a sale, stock decrements and a ledger entry
//! - [`finance`] - Ledger summaries and manual entries
//! - [`inventory`] - Search, low-stock filters, stock adjustment, margins
//! - [`dashboard`] - Headline metrics
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use construflow_core::{Cart, Money, Quantity};
//! use construflow_core::measure::resolve_quantity;
//!
//! // 3m × 4m of floor tiles = 12 m²
//! let area = resolve_quantity(
//!     Quantity::from_whole(3),
//!     Quantity::from_whole(4),
//!     Quantity::zero(),
//! )
//! .unwrap();
//! assert_eq!(area, Quantity::from_whole(12));
//!
//! let mut cart = Cart::new();
//! cart.set_discount(Money::from_cents(500)).unwrap();
//! assert_eq!(cart.total(), Money::zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod dashboard;
pub mod error;
pub mod finance;
pub mod inventory;
pub mod measure;
pub mod money;
pub mod quantity;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use quantity::Quantity;
pub use settlement::Settlement;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Ledger category used for income posted by a settled sale.
pub const SALE_CATEGORY: &str = "Sale";

/// Ledger category applied to manual entries when none is chosen.
pub const DEFAULT_LEDGER_CATEGORY: &str = "General";

/// How many low-stock products the dashboard lists.
pub const LOW_STOCK_PREVIEW: usize = 5;
