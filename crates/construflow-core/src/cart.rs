//! # Cart Accumulator
//!
//! The point-of-sale cart: one line per product, totals derived on read.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Click product ─────────► add_line(p, 1) ────► new line or qty += 1    │
//! │                                                                         │
//! │  m²/m calculator ───────► add_line(p, q) ────► new line or qty += q    │
//! │                                                                         │
//! │  Click remove ──────────► remove_line(id) ───► line dropped (if any)   │
//! │                                                                         │
//! │  Discount field ────────► set_discount(d)                              │
//! │                                                                         │
//! │  subtotal() = Σ line_total                                              │
//! │  total()    = max(0, subtotal - discount)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id`
//! - `line_total == unit_price × quantity` after every mutation
//! - The per-line `discount` is carried but NOT applied to `line_total`

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::Product;

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart (and, after checkout, in a sale).
///
/// ## Price Freezing
/// `unit_price` and `name` are copied from the product when the line is
/// created; later catalog edits do not touch lines already in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    /// Per-line discount. Tracked, never applied to `line_total`.
    pub discount: Money,
    pub line_total: Money,
}

impl CartLine {
    pub fn from_product(product: &Product, quantity: Quantity) -> Result<Self, ValidationError> {
        Ok(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity,
            unit_price: product.sale_price,
            discount: Money::zero(),
            line_total: product.sale_price.times(quantity)?,
        })
    }

    /// This line with `extra` more, priced at the frozen unit price.
    fn merged(&self, extra: Quantity) -> Result<Self, ValidationError> {
        let quantity = self
            .quantity
            .checked_add(extra)
            .ok_or_else(|| ValidationError::out_of_range("quantity"))?;

        Ok(CartLine {
            quantity,
            line_total: self.unit_price.times(quantity)?,
            ..self.clone()
        })
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart plus its general discount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
    general_discount: Money,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `quantity` of `product`, merging into an existing line.
    ///
    /// ## Behavior
    /// - Product already in cart: `quantity += q`, `line_total` recomputed
    ///   with the frozen unit price
    /// - Otherwise: new line at `product.sale_price`, discount 0
    ///
    /// ## Errors
    /// Non-positive quantities are rejected, as are quantities whose line or
    /// cart total would overflow. On error the cart is left untouched.
    pub fn add_line(&mut self, product: &Product, quantity: Quantity) -> Result<(), ValidationError> {
        if !quantity.is_positive() {
            return Err(ValidationError::must_be_positive("quantity"));
        }

        let existing = self.lines.iter().position(|l| l.product_id == product.id);
        let line = match existing {
            Some(index) => self.lines[index].merged(quantity)?,
            None => CartLine::from_product(product, quantity)?,
        };

        // subtotal() sums without checks, so it must stay in range here
        self.lines
            .iter()
            .filter(|l| l.product_id != product.id)
            .try_fold(line.line_total, |acc, l| acc.checked_add(l.line_total))
            .ok_or_else(|| ValidationError::out_of_range("subtotal"))?;

        match existing {
            Some(index) => self.lines[index] = line,
            None => self.lines.push(line),
        }
        Ok(())
    }

    /// Removes the line for `product_id`. Returns whether a line was removed;
    /// an absent product is not an error.
    pub fn remove_line(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Empties the cart and resets the general discount.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.general_discount = Money::zero();
    }

    /// Sets the general (whole-cart) discount.
    ///
    /// A discount larger than the subtotal is allowed; the total floors at zero.
    pub fn set_discount(&mut self, discount: Money) -> Result<(), ValidationError> {
        if discount.is_negative() {
            return Err(ValidationError::must_not_be_negative("discount"));
        }
        self.general_discount = discount;
        Ok(())
    }

    pub fn discount(&self) -> Money {
        self.general_discount
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// `Σ line_total`
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.line_total).sum()
    }

    /// `max(0, subtotal - discount)`
    pub fn total(&self) -> Money {
        (self.subtotal() - self.general_discount).max(Money::zero())
    }
}

/// Cart totals summary for responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub subtotal: Money,
    pub general_discount: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            subtotal: cart.subtotal(),
            general_discount: cart.discount(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
