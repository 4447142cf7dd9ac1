//! # Cart State
//!
//! The sale being assembled at the point of sale: the cart, the selected
//! client and the payment method.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  User Action              Command                 Draft Change          │
//! │  ───────────              ───────                 ────────────          │
//! │                                                                         │
//! │  Click Product ──────────► add_to_cart() ───────► cart.add_line(p, 1)  │
//! │                                                                         │
//! │  m² / m calculator ──────► add_measured() ──────► cart.add_line(p, q)  │
//! │                                                                         │
//! │  Click Remove ───────────► remove_from_cart() ──► cart.remove_line(id) │
//! │                                                                         │
//! │  Pick client ────────────► select_client() ─────► client_id = Some(id) │
//! │                                                                         │
//! │  Checkout ───────────────► finish_sale() ───────► reset() on success   │
//! │                                                                         │
//! │  NOTE: All operations acquire the Mutex lock and release it before     │
//! │        any storage await.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use construflow_core::cart::CartTotals;
use construflow_core::{Cart, PaymentMethod};

/// Everything the checkout screen holds before the sale is settled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    pub cart: Cart,
    pub client_id: Option<String>,
    pub payment_method: PaymentMethod,
}

impl SaleDraft {
    /// Clears the cart and discount. The selected client and payment method
    /// stay, as they do on the checkout screen.
    pub fn reset(&mut self) {
        self.cart.clear();
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::from(&self.cart)
    }
}

/// Shared sale draft state.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<SaleDraft>>`: cart operations are quick and nearly all
/// of them write. A poisoned lock is recovered, since every mutation of the
/// draft leaves it consistent.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    draft: Arc<Mutex<SaleDraft>>,
}

impl CartState {
    pub fn new() -> Self {
        CartState::default()
    }

    /// Executes a function with read access to the draft.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = cart_state.with_cart(|draft| draft.totals());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SaleDraft) -> R,
    {
        let draft = self.draft.lock().unwrap_or_else(PoisonError::into_inner);
        f(&draft)
    }

    /// Executes a function with write access to the draft.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|draft| draft.cart.add_line(&product, qty))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SaleDraft) -> R,
    {
        let mut draft = self.draft.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut draft)
    }

    /// A copy of the current draft.
    pub fn snapshot(&self) -> SaleDraft {
        self.with_cart(Clone::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use construflow_core::{Money, Product, Quantity, UnitOfMeasure};

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: id.to_string(),
            code: format!("C{}", id),
            name: format!("Product {}", id),
            category: "Test".to_string(),
            unit: UnitOfMeasure::Unit,
            cost_price: Money::from_cents(cents / 2),
            sale_price: Money::from_cents(cents),
            fractionable: false,
            current_stock: Quantity::from_whole(10),
            minimum_stock: Quantity::from_whole(1),
            supplier_id: "f1".to_string(),
            active: true,
        }
    }

    #[test]
    fn test_with_cart_mut_is_visible_to_readers() {
        let state = CartState::new();
        let shared = state.clone();

        state
            .with_cart_mut(|d| d.cart.add_line(&product("1", 999), Quantity::from_whole(2)))
            .unwrap();

        assert_eq!(shared.with_cart(|d| d.totals().subtotal), Money::from_cents(1998));
    }

    #[test]
    fn test_reset_keeps_client_and_payment() {
        let state = CartState::new();
        state.with_cart_mut(|d| {
            d.cart.add_line(&product("1", 500), Quantity::one()).unwrap();
            d.cart.set_discount(Money::from_cents(100)).unwrap();
            d.client_id = Some("c2".to_string());
            d.payment_method = PaymentMethod::Fiado;
        });

        state.with_cart_mut(SaleDraft::reset);

        let draft = state.snapshot();
        assert!(draft.cart.is_empty());
        assert_eq!(draft.cart.discount(), Money::zero());
        assert_eq!(draft.client_id.as_deref(), Some("c2"));
        assert_eq!(draft.payment_method, PaymentMethod::Fiado);
    }
}
