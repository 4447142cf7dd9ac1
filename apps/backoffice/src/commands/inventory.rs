//! # Inventory Commands
//!
//! Stock listing with the all/low filter and manual stock adjustment.

use serde::Serialize;
use tracing::{debug, info};

use construflow_core::inventory::{self, StockFilter};
use construflow_core::Quantity;

use crate::commands::catalog::ProductDto;
use crate::error::ApiResult;
use crate::state::DbState;

/// Result of a manual stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub previous: Quantity,
    pub current: Quantity,
}

/// Products for the inventory screen. `Low` keeps `current <= minimum`.
pub async fn list_inventory(db: &DbState, filter: StockFilter) -> ApiResult<Vec<ProductDto>> {
    debug!(filter = ?filter, "list_inventory command");

    let products = db.inner().products().list_or_default().await;
    Ok(inventory::filter_stock(&products, filter)
        .into_iter()
        .map(ProductDto::from)
        .collect())
}

/// Sets a product's stock to an absolute value.
///
/// The value is taken as counted; negative values are accepted so an
/// oversold product can be corrected to what is on the shelf.
pub async fn set_stock(db: &DbState, product_id: &str, new_stock: Quantity) -> ApiResult<StockAdjustment> {
    debug!(product_id = %product_id, new_stock = %new_stock, "set_stock command");

    let products_repo = db.inner().products();
    let mut products = products_repo.list().await?;

    let previous = inventory::set_stock(&mut products, product_id, new_stock)?;
    products_repo.replace_all(&products).await?;

    info!(
        product_id = %product_id,
        previous = %previous,
        current = %new_stock,
        "Stock adjusted"
    );
    Ok(StockAdjustment {
        previous,
        current: new_stock,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
