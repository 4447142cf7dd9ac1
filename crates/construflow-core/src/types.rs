//! # Domain Types
//!
//! The entities persisted by the back office. Each one is stored as an
//! element of a whole-collection JSON array (see `construflow-db`).
//!
//! ## Entity Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Supplier ◄─ supplier_id ── Product ◄─ product_id ── CartLine          │
//! │                                                                         │
//! │  Client ◄─── client_id ──── Sale ──── items: Vec<CartLine>             │
//! │                              ▲                                          │
//! │                              └─ reference_id ── LedgerRecord           │
//! │                                                                         │
//! │  User (login, profile)                                                 │
//! │                                                                         │
//! │  All links are plain strings: no referential integrity is enforced.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::cart::CartLine;
use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Unit of Measure
// =============================================================================

/// How a product is counted and sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    Unit,
    Kg,
    Bag,
    Meter,
    SquareMeter,
}

impl UnitOfMeasure {
    /// Length/area units go through the quantity resolver instead of
    /// being added one at a time.
    pub fn is_measured(&self) -> bool {
        matches!(self, UnitOfMeasure::Meter | UnitOfMeasure::SquareMeter)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnitOfMeasure::Unit => "un",
            UnitOfMeasure::Kg => "kg",
            UnitOfMeasure::Bag => "bag",
            UnitOfMeasure::Meter => "m",
            UnitOfMeasure::SquareMeter => "m²",
        }
    }
}

impl FromStr for UnitOfMeasure {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "un" | "unit" => Ok(UnitOfMeasure::Unit),
            "kg" => Ok(UnitOfMeasure::Kg),
            "bag" | "saco" => Ok(UnitOfMeasure::Bag),
            "m" | "meter" | "metro" => Ok(UnitOfMeasure::Meter),
            "m2" | "m²" | "square_meter" => Ok(UnitOfMeasure::SquareMeter),
            _ => Err(ValidationError::NotAllowed {
                field: "unit".to_string(),
                allowed: ["un", "kg", "bag", "m", "m2"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,

    /// Short business code typed at the counter ("001").
    pub code: String,

    pub name: String,

    pub category: String,

    pub unit: UnitOfMeasure,

    pub cost_price: Money,

    pub sale_price: Money,

    /// Whether the product may be sold in fractions of its unit.
    pub fractionable: bool,

    /// Current stock. May go negative after an oversell.
    pub current_stock: Quantity,

    /// Reorder threshold: at or below this level the product is "low stock".
    pub minimum_stock: Quantity,

    pub supplier_id: String,

    pub active: bool,
}

impl Product {
    /// `current_stock <= minimum_stock`.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.minimum_stock
    }

    /// Markup over cost, in percent. `None` when cost is zero.
    pub fn margin_percent(&self) -> Option<f64> {
        (self.sale_price - self.cost_price).percent_of(self.cost_price)
    }
}

// =============================================================================
// Client & Supplier
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ClientSegment {
    Retail,
    Wholesale,
}

/// A customer account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    /// CPF or CNPJ, as typed.
    pub tax_id: String,
    pub phone: String,
    pub address: String,
    pub segment: ClientSegment,
    pub credit_limit: Money,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub tax_id: String,
    pub phone: String,
    pub address: String,
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserProfile {
    Admin,
    Seller,
    Finance,
}

/// A back office account, as stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub login: String,
    pub profile: UserProfile,
    pub active: bool,
    /// PHC string (argon2id).
    pub password_hash: String,
}

/// The authenticated user as held in the session key. Never carries the
/// password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub login: String,
    pub profile: UserProfile,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        SessionUser {
            id: user.id.clone(),
            name: user.name.clone(),
            login: user.login.clone(),
            profile: user.profile,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Pix,
    DebitCard,
    CreditCard,
    Boleto,
    /// Store credit: the customer pays later.
    Fiado,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Cash,
        PaymentMethod::Pix,
        PaymentMethod::DebitCard,
        PaymentMethod::CreditCard,
        PaymentMethod::Boleto,
        PaymentMethod::Fiado,
    ];

    /// Deferred payments post their income as pending.
    #[inline]
    pub fn is_deferred(&self) -> bool {
        matches!(self, PaymentMethod::Fiado)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Pix => "Pix",
            PaymentMethod::DebitCard => "Debit card",
            PaymentMethod::CreditCard => "Credit card",
            PaymentMethod::Boleto => "Boleto",
            PaymentMethod::Fiado => "Fiado",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(|c: char| c == '-' || c == ' ', "_").as_str() {
            "cash" | "dinheiro" => Ok(PaymentMethod::Cash),
            "pix" => Ok(PaymentMethod::Pix),
            "debit" | "debit_card" => Ok(PaymentMethod::DebitCard),
            "credit" | "credit_card" => Ok(PaymentMethod::CreditCard),
            "boleto" => Ok(PaymentMethod::Boleto),
            "fiado" => Ok(PaymentMethod::Fiado),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: PaymentMethod::ALL
                    .iter()
                    .map(|m| m.label().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    #[default]
    Completed,
    Pending,
    Cancelled,
}

/// A settled sale.
///
/// Items are a snapshot of the cart at checkout: later price or name
/// changes in the catalog do not affect recorded sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub client_id: String,
    pub client_name: String,
    pub items: Vec<CartLine>,
    pub subtotal: Money,
    pub general_discount: Money,
    /// `max(0, subtotal - general_discount)`
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Ok(TransactionType::Income),
            "expense" | "out" => Ok(TransactionType::Expense),
            _ => Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: vec!["income".to_string(), "expense".to_string()],
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LedgerStatus {
    Paid,
    Pending,
}

impl FromStr for LedgerStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Ok(LedgerStatus::Paid),
            "pending" => Ok(LedgerStatus::Pending),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec!["paid".to_string(), "pending".to_string()],
            }),
        }
    }
}

/// One line of the finance ledger.
///
/// `amount` is never negative; the sign is implied by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub amount: Money,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub description: String,
    pub status: LedgerStatus,
    /// Sale (or purchase) this record was posted for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
}

impl LedgerRecord {
    /// Amount with its sign applied: income positive, expense negative.
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
