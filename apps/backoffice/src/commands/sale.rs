//! # Sale Commands
//!
//! Checkout and sale history.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    finish_sale                                          │
//! │                                                                         │
//! │  1. Snapshot the draft (cart, client, payment method)                  │
//! │  2. No client or empty cart ──────────────────► Ok(None), no-op        │
//! │  3. Settlement::prepare: Sale + income ledger record                   │
//! │  4. Database::commit_settlement                                        │
//! │       sales += sale, stock -= sold, finance += record                  │
//! │       (one atomic batch)                                                │
//! │  5. Commit failed? ──► error, cart untouched, user can retry           │
//! │  6. Clear cart and discount ──► Ok(Some(receipt))                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use construflow_core::inventory::find_client;
use construflow_core::{LedgerStatus, Sale, Settlement};

use crate::error::ApiResult;
use crate::state::{CartState, DbState};

/// What the checkout screen shows after a settled sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    pub sale: Sale,
    pub ledger_record_id: String,
    /// `pending` for Fiado, `paid` otherwise.
    pub ledger_status: LedgerStatus,
}

impl From<Settlement> for SaleReceipt {
    fn from(settlement: Settlement) -> Self {
        SaleReceipt {
            ledger_record_id: settlement.ledger_record.id,
            ledger_status: settlement.ledger_record.status,
            sale: settlement.sale,
        }
    }
}

/// Settles the current cart.
///
/// ## Returns
/// * `Ok(Some(receipt))` - sale, stock and ledger were written together
/// * `Ok(None)` - no client selected or empty cart; nothing happened
/// * `Err(_)` - nothing was written and the cart is unchanged
pub async fn finish_sale(db: &DbState, cart: &CartState) -> ApiResult<Option<SaleReceipt>> {
    debug!("finish_sale command");

    let draft = cart.snapshot();
    let Some(client_id) = draft.client_id.as_deref() else {
        debug!("No client selected, checkout skipped");
        return Ok(None);
    };
    if draft.cart.is_empty() {
        debug!("Cart is empty, checkout skipped");
        return Ok(None);
    }

    let clients = db.inner().clients().list().await?;
    let client = find_client(&clients, client_id)?;

    let Some(settlement) =
        Settlement::prepare(&draft.cart, Some(client), draft.payment_method, Utc::now())
    else {
        return Ok(None);
    };

    db.inner().commit_settlement(&settlement).await?;

    cart.with_cart_mut(|d| d.reset());

    info!(
        sale_id = %settlement.sale.id,
        client = %client.name,
        method = %settlement.sale.payment_method,
        "Sale finished"
    );
    Ok(Some(SaleReceipt::from(settlement)))
}

/// All recorded sales, oldest first.
pub async fn list_sales(db: &DbState) -> ApiResult<Vec<Sale>> {
    debug!("list_sales command");
    Ok(db.inner().sales().list_or_default().await)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use construflow_core::{Money, PaymentMethod, Quantity};
    use construflow_db::{Database, MemoryStore};

    use crate::commands::cart::{add_to_cart, select_client, set_payment_method};
    use crate::error::ErrorCode;

    async fn filled_cart(db: &DbState, qty: i64) -> CartState {
        let cart = CartState::new();
        add_to_cart(db, &cart, "1", Some(Quantity::from_whole(qty)))
            .await
            .unwrap();
        select_client(db, &cart, "c2").await.unwrap();
        cart
    }

    #[tokio::test]
    async fn test_finish_sale_writes_all_three_collections() {
        let db = DbState::new(Database::in_memory());
        let cart = filled_cart(&db, 8).await;

        let receipt = finish_sale(&db, &cart).await.unwrap().unwrap();

        assert_eq!(receipt.sale.total, Money::from_cents(28_000));
        assert_eq!(receipt.ledger_status, LedgerStatus::Paid);
        assert_eq!(list_sales(&db).await.unwrap().len(), 1);

        let products = db.inner().products().list().await.unwrap();
        assert_eq!(products[0].current_stock, Quantity::from_whole(142));

        let ledger = db.inner().ledger().list().await.unwrap();
        assert_eq!(ledger[0].id, receipt.ledger_record_id);
        assert_eq!(
            ledger[0].description,
            format!("Sale #{} - Construtora Silva LTDA", receipt.sale.id)
        );

        // cart cleared, client kept
        let draft = cart.snapshot();
        assert!(draft.cart.is_empty());
        assert_eq!(draft.client_id.as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn test_fiado_sale_is_pending() {
        let db = DbState::new(Database::in_memory());
        let cart = filled_cart(&db, 1).await;
        set_payment_method(&cart, PaymentMethod::Fiado);

        let receipt = finish_sale(&db, &cart).await.unwrap().unwrap();
        assert_eq!(receipt.ledger_status, LedgerStatus::Pending);
    }

    #[tokio::test]
    async fn test_preconditions_are_silent_no_ops() {
        let db = DbState::new(Database::in_memory());

        // empty cart, no client
        let cart = CartState::new();
        assert_eq!(finish_sale(&db, &cart).await.unwrap(), None);

        // items but no client
        add_to_cart(&db, &cart, "1", None).await.unwrap();
        assert_eq!(finish_sale(&db, &cart).await.unwrap(), None);
        assert!(!cart.snapshot().cart.is_empty());

        assert!(list_sales(&db).await.unwrap().is_empty());
        assert!(db.inner().written_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_cart() {
        let memory = Arc::new(MemoryStore::new());
        let db = DbState::new(Database::with_store(memory.clone()));
        let cart = filled_cart(&db, 2).await;

        memory.fail_writes(true);
        let err = finish_sale(&db, &cart).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageError);
        memory.fail_writes(false);

        assert_eq!(cart.snapshot().cart.line_count(), 1);
        assert!(list_sales(&db).await.unwrap().is_empty());
        assert!(db.inner().ledger().list().await.unwrap().is_empty());

        // retry succeeds
        assert!(finish_sale(&db, &cart).await.unwrap().is_some());
    }
}
