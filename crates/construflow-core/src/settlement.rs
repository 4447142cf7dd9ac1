//! # Settlement Planning
//!
//! Turns a cart into everything a checkout must persist, without touching
//! storage.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Settlement                                      │
//! │                                                                         │
//! │  Cart + Client + PaymentMethod                                          │
//! │       │                                                                 │
//! │       ├── cart empty or no client? ──► None (no-op)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Settlement::prepare() ← THIS MODULE                                   │
//! │       │                                                                 │
//! │       ├── Sale          { status: completed, items: cart snapshot }    │
//! │       ├── LedgerRecord  { income, "Sale", total, paid | pending }      │
//! │       └── stock deltas  { product_id → sold quantity }                  │
//! │                                                                         │
//! │  construflow-db commits all three collections in ONE transaction       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::cart::{Cart, CartLine};
use crate::quantity::Quantity;
use crate::types::{
    Client, LedgerRecord, LedgerStatus, PaymentMethod, Product, Sale, SaleStatus, TransactionType,
};
use crate::SALE_CATEGORY;

/// Prefix for ledger records posted by a sale.
pub const SALE_LEDGER_PREFIX: &str = "FIN-";

/// A checkout ready to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub sale: Sale,
    pub ledger_record: LedgerRecord,
}

impl Settlement {
    /// Builds the sale and its income record from the current cart.
    ///
    /// Returns `None` when the cart is empty or no client is selected;
    /// checkout is then a silent no-op.
    pub fn prepare(
        cart: &Cart,
        client: Option<&Client>,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Option<Settlement> {
        let client = client?;
        if cart.is_empty() {
            return None;
        }

        let sale = Sale {
            id: Uuid::now_v7().to_string(),
            date: now,
            client_id: client.id.clone(),
            client_name: client.name.clone(),
            items: cart.lines().to_vec(),
            subtotal: cart.subtotal(),
            general_discount: cart.discount(),
            total: cart.total(),
            payment_method,
            status: SaleStatus::Completed,
        };

        let status = if payment_method.is_deferred() {
            LedgerStatus::Pending
        } else {
            LedgerStatus::Paid
        };

        let ledger_record = LedgerRecord {
            id: format!("{}{}", SALE_LEDGER_PREFIX, Uuid::now_v7()),
            kind: TransactionType::Income,
            category: SALE_CATEGORY.to_string(),
            amount: sale.total,
            date: now,
            description: format!("Sale #{} - {}", sale.id, client.name),
            status,
            reference_id: Some(sale.id.clone()),
        };

        Some(Settlement {
            sale,
            ledger_record,
        })
    }

    /// Quantity sold per product id.
    pub fn stock_deltas(&self) -> HashMap<String, Quantity> {
        sold_quantities(&self.sale.items)
    }

    /// Decrements stock on every product that appears in the sale.
    ///
    /// No floor at zero: selling 8 of a product with stock 5 leaves -3.
    /// Products missing from `products` are skipped. Returns how many
    /// products were adjusted.
    pub fn apply_to_stock(&self, products: &mut [Product]) -> usize {
        let deltas = self.stock_deltas();
        let mut adjusted = 0;

        for product in products.iter_mut() {
            if let Some(sold) = deltas.get(&product.id) {
                product.current_stock -= *sold;
                adjusted += 1;
            }
        }

        adjusted
    }
}

fn sold_quantities(lines: &[CartLine]) -> HashMap<String, Quantity> {
    let mut sold: HashMap<String, Quantity> = HashMap::new();
    for line in lines {
        *sold.entry(line.product_id.clone()).or_default() += line.quantity;
    }
    sold
}

// =============================================================================
// Unit Tests
// =============================================================================
