//! # Catalog Commands
//!
//! Product and client search, registration and the supplier list.
//!
//! ## Search Rules
//! ```text
//! products:  name contains q (case-insensitive)  OR  code contains q
//! POS:       same, active products only
//! clients:   name contains q (case-insensitive)  OR  tax id contains q
//! empty q:   everything
//! ```

use serde::Serialize;
use tracing::{debug, info};

use construflow_core::inventory::{self, NewClient, NewProduct};
use construflow_core::validation::validate_search_query;
use construflow_core::{Client, Product, Supplier};

use crate::error::ApiResult;
use crate::state::DbState;

/// Product with the derived figures the catalog screens show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(flatten)]
    pub product: Product,
    /// `(sale - cost) / cost × 100`, absent when cost is zero.
    pub margin_percent: Option<f64>,
    pub low_stock: bool,
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        ProductDto {
            margin_percent: product.margin_percent(),
            low_stock: product.is_low_stock(),
            product: product.clone(),
        }
    }
}

/// Searches the whole catalog (products screen).
pub async fn search_products(db: &DbState, query: &str) -> ApiResult<Vec<ProductDto>> {
    debug!(query = %query, "search_products command");
    let query = validate_search_query(query)?;

    let products = db.inner().products().list_or_default().await;
    Ok(inventory::search_products(&products, &query)
        .into_iter()
        .map(ProductDto::from)
        .collect())
}

/// Searches the products offered at the point of sale.
pub async fn search_sellable(db: &DbState, query: &str) -> ApiResult<Vec<ProductDto>> {
    debug!(query = %query, "search_sellable command");
    let query = validate_search_query(query)?;

    let products = db.inner().products().list_or_default().await;
    Ok(inventory::search_sellable(&products, &query)
        .into_iter()
        .map(ProductDto::from)
        .collect())
}

pub async fn search_clients(db: &DbState, query: &str) -> ApiResult<Vec<Client>> {
    debug!(query = %query, "search_clients command");
    let query = validate_search_query(query)?;

    let clients = db.inner().clients().list_or_default().await;
    Ok(inventory::search_clients(&clients, &query)
        .into_iter()
        .cloned()
        .collect())
}

/// Registers a product.
///
/// ## Errors
/// - `VALIDATION_ERROR` for blank code/name, negative prices or stock, or a
///   code already in the catalog
pub async fn create_product(db: &DbState, form: NewProduct) -> ApiResult<ProductDto> {
    debug!(code = %form.code, "create_product command");

    let products_repo = db.inner().products();
    let mut products = products_repo.list().await?;

    let product = form.into_product(&products)?;
    products.push(product.clone());
    products_repo.replace_all(&products).await?;

    info!(product_id = %product.id, code = %product.code, "Product registered");
    Ok(ProductDto::from(&product))
}

pub async fn create_client(db: &DbState, form: NewClient) -> ApiResult<Client> {
    debug!(name = %form.name, "create_client command");

    let client = form.into_client()?;
    db.inner().clients().append(client.clone()).await?;

    info!(client_id = %client.id, "Client registered");
    Ok(client)
}

pub async fn list_suppliers(db: &DbState) -> ApiResult<Vec<Supplier>> {
    debug!("list_suppliers command");
    Ok(db.inner().suppliers().list_or_default().await)
}

// =============================================================================
// Unit Tests
// =============================================================================
