//! # Catalog & Inventory
//!
//! Search, low-stock filtering, manual stock adjustment and registration of
//! products and clients. Every function works on a full collection loaded
//! from storage; the caller writes the collection back.
//!
//! ## Search Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Query "cim"                                                            │
//! │                                                                         │
//! │  products:  name contains "cim" (case-insensitive)  OR  code contains  │
//! │  POS:       same, active products only                                 │
//! │  clients:   name contains "cim" (case-insensitive)  OR  tax id contains│
//! │                                                                         │
//! │  Empty query matches everything.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{Client, ClientSegment, Product, UnitOfMeasure};
use crate::validation::{
    validate_code, validate_name, validate_non_negative_money, validate_non_negative_quantity,
};

// =============================================================================
// Search
// =============================================================================

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Catalog search: name (case-insensitive) or code substring.
pub fn search_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    products
        .iter()
        .filter(|p| contains_ci(&p.name, &needle) || p.code.to_lowercase().contains(&needle))
        .collect()
}

/// Point-of-sale search: like [`search_products`], active products only.
pub fn search_sellable<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    search_products(products, query)
        .into_iter()
        .filter(|p| p.active)
        .collect()
}

/// Client search: name (case-insensitive) or tax id substring.
pub fn search_clients<'a>(clients: &'a [Client], query: &str) -> Vec<&'a Client> {
    let needle = query.trim().to_lowercase();
    clients
        .iter()
        .filter(|c| contains_ci(&c.name, &needle) || c.tax_id.to_lowercase().contains(&needle))
        .collect()
}

// =============================================================================
// Stock
// =============================================================================

/// Inventory screen filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter {
    #[default]
    All,
    Low,
}

impl FromStr for StockFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(StockFilter::All),
            "low" => Ok(StockFilter::Low),
            _ => Err(ValidationError::NotAllowed {
                field: "filter".to_string(),
                allowed: vec!["all".to_string(), "low".to_string()],
            }),
        }
    }
}

pub fn filter_stock(products: &[Product], filter: StockFilter) -> Vec<&Product> {
    products
        .iter()
        .filter(|p| filter == StockFilter::All || p.is_low_stock())
        .collect()
}

pub fn low_stock(products: &[Product]) -> Vec<&Product> {
    filter_stock(products, StockFilter::Low)
}

/// Sets a product's stock to an absolute value and returns the previous one.
///
/// Any value is accepted here, including negatives (stock can legitimately
/// be negative after an oversell and the adjustment corrects it).
pub fn set_stock(products: &mut [Product], product_id: &str, new_stock: Quantity) -> CoreResult<Quantity> {
    let product = products
        .iter_mut()
        .find(|p| p.id == product_id)
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    let previous = product.current_stock;
    product.current_stock = new_stock;
    Ok(previous)
}

pub fn find_product<'a>(products: &'a [Product], product_id: &str) -> CoreResult<&'a Product> {
    products
        .iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))
}

pub fn find_client<'a>(clients: &'a [Client], client_id: &str) -> CoreResult<&'a Client> {
    clients
        .iter()
        .find(|c| c.id == client_id)
        .ok_or_else(|| CoreError::ClientNotFound(client_id.to_string()))
}

// =============================================================================
// Registration
// =============================================================================

/// Product registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub unit: UnitOfMeasure,
    pub cost_price: Money,
    pub sale_price: Money,
    #[serde(default)]
    pub fractionable: bool,
    #[serde(default)]
    pub current_stock: Quantity,
    #[serde(default)]
    pub minimum_stock: Quantity,
    #[serde(default)]
    pub supplier_id: String,
}

impl NewProduct {
    /// Validates the form against the existing catalog.
    ///
    /// ## Rules
    /// - Code and name required
    /// - Code unique across the catalog (case-insensitive)
    /// - Prices and stock levels not negative
    pub fn into_product(self, existing: &[Product]) -> Result<Product, ValidationError> {
        validate_code(&self.code)?;
        validate_name("name", &self.name)?;
        validate_non_negative_money("cost price", self.cost_price)?;
        validate_non_negative_money("sale price", self.sale_price)?;
        validate_non_negative_quantity("current stock", self.current_stock)?;
        validate_non_negative_quantity("minimum stock", self.minimum_stock)?;

        let code = self.code.trim().to_string();
        if existing.iter().any(|p| p.code.eq_ignore_ascii_case(&code)) {
            return Err(ValidationError::Duplicate {
                field: "code".to_string(),
                value: code,
            });
        }

        Ok(Product {
            id: Uuid::now_v7().to_string(),
            code,
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            unit: self.unit,
            cost_price: self.cost_price,
            sale_price: self.sale_price,
            fractionable: self.fractionable,
            current_stock: self.current_stock,
            minimum_stock: self.minimum_stock,
            supplier_id: self.supplier_id.trim().to_string(),
            active: true,
        })
    }
}

/// Client registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub segment: ClientSegment,
    #[serde(default)]
    pub credit_limit: Money,
}

impl NewClient {
    pub fn into_client(self) -> Result<Client, ValidationError> {
        validate_name("name", &self.name)?;
        validate_non_negative_money("credit limit", self.credit_limit)?;

        Ok(Client {
            id: Uuid::now_v7().to_string(),
            name: self.name.trim().to_string(),
            tax_id: self.tax_id.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            segment: self.segment,
            credit_limit: self.credit_limit,
            active: true,
        })
    }
}

impl FromStr for ClientSegment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retail" | "varejo" => Ok(ClientSegment::Retail),
            "wholesale" | "atacado" => Ok(ClientSegment::Wholesale),
            _ => Err(ValidationError::NotAllowed {
                field: "segment".to_string(),
                allowed: vec!["retail".to_string(), "wholesale".to_string()],
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, code: &str, name: &str, stock: i64, minimum: i64, active: bool) -> Product {
        Product {
            id: id.to_string(),
            code: code.to_string(),
            name: name.to_string(),
            category: String::new(),
            unit: UnitOfMeasure::Unit,
            cost_price: Money::zero(),
            sale_price: Money::from_cents(100),
            fractionable: false,
            current_stock: Quantity::from_whole(stock),
            minimum_stock: Quantity::from_whole(minimum),
            supplier_id: String::new(),
            active,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("1", "001", "Cimento CP II 50kg", 150, 50, true),
            product("2", "002", "Piso Cerâmico 60x60", 40, 40, true),
            product("3", "003", "Areia Lavada", 15, 5, false),
        ]
    }

    fn client(id: &str, name: &str, tax_id: &str) -> Client {
        Client {
            id: id.to_string(),
            name: name.to_string(),
            tax_id: tax_id.to_string(),
            phone: String::new(),
            address: String::new(),
            segment: ClientSegment::Retail,
            credit_limit: Money::zero(),
            active: true,
        }
    }

    fn new_product(code: &str) -> NewProduct {
        NewProduct {
            code: code.to_string(),
            name: "Tijolo 8 furos".to_string(),
            category: "Alvenaria".to_string(),
            unit: UnitOfMeasure::Unit,
            cost_price: Money::from_cents(80),
            sale_price: Money::from_cents(120),
            fractionable: false,
            current_stock: Quantity::from_whole(1000),
            minimum_stock: Quantity::from_whole(200),
            supplier_id: String::new(),
        }
    }

    #[test]
    fn test_search_by_name_or_code() {
        let products = catalog();
        let ids = |found: Vec<&Product>| found.iter().map(|p| p.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(search_products(&products, "CIMENTO")), vec!["1"]);
        assert_eq!(ids(search_products(&products, "003")), vec!["3"]);
        assert_eq!(search_products(&products, "").len(), 3);
        assert!(search_products(&products, "tijolo").is_empty());
    }

    #[test]
    fn test_pos_search_skips_inactive() {
        let products = catalog();
        assert!(search_sellable(&products, "areia").is_empty());
        assert_eq!(search_sellable(&products, "").len(), 2);
    }

    #[test]
    fn test_search_clients() {
        let clients = vec![
            client("c1", "Consumidor Final", "000.000.000-00"),
            client("c2", "Construtora Silva LTDA", "12.345.678/0001-99"),
        ];
        assert_eq!(search_clients(&clients, "silva")[0].id, "c2");
        assert_eq!(search_clients(&clients, "000.000")[0].id, "c1");
        assert_eq!(search_clients(&clients, "cons").len(), 2);
    }

    #[test]
    fn test_low_stock_filter() {
        let products = catalog();
        let low = filter_stock(&products, StockFilter::Low);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, "2");
        assert_eq!(filter_stock(&products, StockFilter::All).len(), 3);
        assert_eq!("LOW".parse::<StockFilter>().unwrap(), StockFilter::Low);
        assert!("some".parse::<StockFilter>().is_err());
    }

    #[test]
    fn test_set_stock_is_absolute() {
        let mut products = catalog();
        let previous = set_stock(&mut products, "1", Quantity::from_whole(10)).unwrap();
        assert_eq!(previous, Quantity::from_whole(150));
        assert_eq!(products[0].current_stock, Quantity::from_whole(10));
        assert!(products[0].is_low_stock());

        assert!(matches!(
            set_stock(&mut products, "x", Quantity::zero()),
            Err(CoreError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_register_product() {
        let product = new_product("004").into_product(&catalog()).unwrap();
        assert_eq!(product.code, "004");
        assert!(product.active);
        assert!(!product.id.is_empty());
    }

    #[test]
    fn test_register_product_rejects_duplicate_code() {
        let err = new_product("001").into_product(&catalog()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Duplicate {
                field: "code".to_string(),
                value: "001".to_string()
            }
        );
    }

    #[test]
    fn test_register_product_rejects_negative_values() {
        let mut form = new_product("005");
        form.sale_price = Money::from_cents(-1);
        assert!(form.into_product(&[]).is_err());

        let mut form = new_product("005");
        form.current_stock = Quantity::from_whole(-1);
        assert!(form.into_product(&[]).is_err());

        let mut form = new_product("005");
        form.name = " ".to_string();
        assert!(form.into_product(&[]).is_err());
    }

    #[test]
    fn test_register_client() {
        let form = NewClient {
            name: " Maria Souza ".to_string(),
            tax_id: "111.222.333-44".to_string(),
            phone: String::new(),
            address: String::new(),
            segment: "varejo".parse().unwrap(),
            credit_limit: Money::from_cents(100_000),
        };
        let client = form.into_client().unwrap();
        assert_eq!(client.name, "Maria Souza");
        assert_eq!(client.segment, ClientSegment::Retail);

        let bad = NewClient {
            name: String::new(),
            tax_id: String::new(),
            phone: String::new(),
            address: String::new(),
            segment: ClientSegment::Retail,
            credit_limit: Money::zero(),
        };
        assert!(bad.into_client().is_err());
    }
}
