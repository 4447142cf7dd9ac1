//! # Cart Commands
//!
//! Point-of-sale cart manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  Client  │────►│  Settled │       │
//! │  │  Cart    │     │          │     │ + Method │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart      select_client                       │
//! │                   add_measured     set_payment_method                  │
//! │                   remove_from_cart finish_sale (sale.rs)               │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Product and client reads here are strict: a corrupt catalog is reported
//! instead of silently offering the seed list.

use serde::Serialize;
use tracing::debug;

use construflow_core::cart::{CartLine, CartTotals};
use construflow_core::inventory::{find_client, find_product};
use construflow_core::measure::MeasureInput;
use construflow_core::{CoreError, Money, PaymentMethod, Product, Quantity};

use crate::error::{ApiError, ApiResult};
use crate::state::{CartState, DbState, SaleDraft};

/// Cart response including lines, totals and the checkout selections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
    pub client_id: Option<String>,
    pub payment_method: PaymentMethod,
}

impl From<&SaleDraft> for CartResponse {
    fn from(draft: &SaleDraft) -> Self {
        CartResponse {
            lines: draft.cart.lines().to_vec(),
            totals: draft.totals(),
            client_id: draft.client_id.clone(),
            payment_method: draft.payment_method,
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|draft| CartResponse::from(draft))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - If product already in cart: quantity increases
/// - If product not in cart: added as new line at the current sale price
/// - Quantity defaults to one (a click on the product card)
///
/// ## Errors
/// - `NOT_FOUND` for an unknown product id
/// - `VALIDATION_ERROR` for an inactive product or a non-positive quantity
pub async fn add_to_cart(
    db: &DbState,
    cart: &CartState,
    product_id: &str,
    quantity: Option<Quantity>,
) -> ApiResult<CartResponse> {
    let quantity = quantity.unwrap_or_else(Quantity::one);
    debug!(product_id = %product_id, quantity = %quantity, "add_to_cart command");

    let product = sellable_product(db, product_id).await?;

    cart.with_cart_mut(|draft| -> ApiResult<CartResponse> {
        draft.cart.add_line(&product, quantity)?;
        Ok(CartResponse::from(&*draft))
    })
}

/// Adds an area or length product from the measure calculator.
///
/// Only meter and square-meter products go through the calculator; other
/// units are rejected. `manual` wins when positive, otherwise
/// `length × width` is used. A resolved quantity of zero or less adds
/// nothing.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Piso Cerâmico 60x60 (m²)                                              │
/// │                                                                         │
/// │  Length [ 3,00 ]  ×  Width [ 4,00 ]    or   Manual [      ]            │
/// │                                                                         │
/// │  Total: 12,000 m²                         [ Add to cart ]              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn add_measured(
    db: &DbState,
    cart: &CartState,
    product_id: &str,
    length: Quantity,
    width: Quantity,
    manual: Quantity,
) -> ApiResult<CartResponse> {
    debug!(
        product_id = %product_id,
        length = %length,
        width = %width,
        manual = %manual,
        "add_measured command"
    );

    let product = sellable_product(db, product_id).await?;
    if !product.unit.is_measured() {
        return Err(ApiError::validation(format!(
            "Product {} is not sold by length or area",
            product.id
        )));
    }

    let mut input = MeasureInput::new();
    input.set_length(length);
    input.set_width(width);
    if manual.is_positive() {
        input.set_manual(manual);
    }
    let quantity = input.submit()?;

    cart.with_cart_mut(|draft| -> ApiResult<CartResponse> {
        draft.cart.add_line(&product, quantity)?;
        Ok(CartResponse::from(&*draft))
    })
}

/// Removes a product line. Removing an absent product is not an error.
pub fn remove_from_cart(cart: &CartState, product_id: &str) -> CartResponse {
    debug!(product_id = %product_id, "remove_from_cart command");
    cart.with_cart_mut(|draft| {
        draft.cart.remove_line(product_id);
        CartResponse::from(&*draft)
    })
}

/// Empties the cart and resets the general discount.
pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");
    cart.with_cart_mut(|draft| {
        draft.reset();
        CartResponse::from(&*draft)
    })
}

/// Sets the general (whole-cart) discount. Negative amounts are rejected.
pub fn set_discount(cart: &CartState, discount: Money) -> ApiResult<CartResponse> {
    debug!(discount = discount.cents(), "set_discount command");
    cart.with_cart_mut(|draft| -> ApiResult<CartResponse> {
        draft.cart.set_discount(discount)?;
        Ok(CartResponse::from(&*draft))
    })
}

/// Selects the client the sale is billed to.
pub async fn select_client(
    db: &DbState,
    cart: &CartState,
    client_id: &str,
) -> ApiResult<CartResponse> {
    debug!(client_id = %client_id, "select_client command");

    let clients = db.inner().clients().list().await?;
    let client = find_client(&clients, client_id)?;

    Ok(cart.with_cart_mut(|draft| {
        draft.client_id = Some(client.id.clone());
        CartResponse::from(&*draft)
    }))
}

/// Preselects the first registered client (the walk-in "Consumidor Final"
/// in the seed data) when no client is chosen yet. An existing selection is
/// kept, and an empty clients collection leaves the draft without a client.
pub async fn preselect_default_client(db: &DbState, cart: &CartState) -> ApiResult<CartResponse> {
    debug!("preselect_default_client command");

    let clients = db.inner().clients().list().await?;
    let default_id = clients.first().map(|c| c.id.clone());

    Ok(cart.with_cart_mut(|draft| {
        if draft.client_id.is_none() {
            draft.client_id = default_id;
        }
        CartResponse::from(&*draft)
    }))
}

pub fn set_payment_method(cart: &CartState, method: PaymentMethod) -> CartResponse {
    debug!(method = %method, "set_payment_method command");
    cart.with_cart_mut(|draft| {
        draft.payment_method = method;
        CartResponse::from(&*draft)
    })
}

async fn sellable_product(db: &DbState, product_id: &str) -> ApiResult<Product> {
    let products = db.inner().products().list().await?;
    let product = find_product(&products, product_id)?;

    if !product.active {
        return Err(CoreError::ProductInactive(product.id.clone()).into());
    }

    Ok(product.clone())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use construflow_db::Database;

    fn setup() -> (DbState, CartState) {
        (DbState::new(Database::in_memory()), CartState::new())
    }

    #[tokio::test]
    async fn test_add_same_product_twice_merges_line() {
        let (db, cart) = setup();

        add_to_cart(&db, &cart, "1", None).await.unwrap();
        let response = add_to_cart(&db, &cart, "1", Some(Quantity::from_whole(2)))
            .await
            .unwrap();

        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.lines[0].quantity, Quantity::from_whole(3));
        // 3 × R$ 35.00
        assert_eq!(response.totals.subtotal, Money::from_cents(10_500));
    }

    #[tokio::test]
    async fn test_add_measured_uses_length_times_width() {
        let (db, cart) = setup();

        let response = add_measured(
            &db,
            &cart,
            "2",
            Quantity::from_whole(3),
            Quantity::from_whole(4),
            Quantity::zero(),
        )
        .await
        .unwrap();

        assert_eq!(response.lines[0].quantity, Quantity::from_whole(12));
        // 12 m² × R$ 29.90
        assert_eq!(response.lines[0].line_total, Money::from_cents(35_880));
    }

    #[tokio::test]
    async fn test_add_measured_rejects_zero() {
        let (db, cart) = setup();

        let err = add_measured(&db, &cart, "2", Quantity::zero(), Quantity::zero(), Quantity::zero())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(get_cart(&cart).lines.is_empty());
    }

    #[tokio::test]
    async fn test_add_measured_rejects_unmeasured_products() {
        let (db, cart) = setup();

        // product 1 is sold by the bag
        let err = add_measured(
            &db,
            &cart,
            "1",
            Quantity::from_whole(3),
            Quantity::from_whole(4),
            Quantity::zero(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(get_cart(&cart).lines.is_empty());
    }

    #[tokio::test]
    async fn test_add_measured_manual_override() {
        let (db, cart) = setup();

        let response = add_measured(
            &db,
            &cart,
            "2",
            Quantity::from_whole(3),
            Quantity::from_whole(4),
            Quantity::from_milli(7_500),
        )
        .await
        .unwrap();

        assert_eq!(response.lines[0].quantity, Quantity::from_milli(7_500));
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_products() {
        let (db, cart) = setup();

        let err = add_to_cart(&db, &cart, "999", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let products_repo = db.inner().products();
        let mut products = products_repo.list().await.unwrap();
        products[0].active = false;
        products_repo.replace_all(&products).await.unwrap();

        let err = add_to_cart(&db, &cart, "1", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(get_cart(&cart).lines.is_empty());
    }

    #[tokio::test]
    async fn test_discount_and_clear() {
        let (db, cart) = setup();
        add_to_cart(&db, &cart, "1", None).await.unwrap();

        let response = set_discount(&cart, Money::from_cents(5_000)).unwrap();
        assert_eq!(response.totals.total, Money::zero());

        assert!(set_discount(&cart, Money::from_cents(-1)).is_err());

        remove_from_cart(&cart, "not-in-cart");
        let response = clear_cart(&cart);
        assert!(response.lines.is_empty());
        assert_eq!(response.totals.general_discount, Money::zero());
    }

    #[tokio::test]
    async fn test_preselects_first_client() {
        let (db, cart) = setup();

        let response = preselect_default_client(&db, &cart).await.unwrap();
        assert_eq!(response.client_id.as_deref(), Some("c1"));

        select_client(&db, &cart, "c2").await.unwrap();
        let response = preselect_default_client(&db, &cart).await.unwrap();
        assert_eq!(response.client_id.as_deref(), Some("c2"));

        // no clients registered
        let (db, cart) = setup();
        db.inner().clients().replace_all(&[]).await.unwrap();
        let response = preselect_default_client(&db, &cart).await.unwrap();
        assert_eq!(response.client_id, None);
    }

    #[tokio::test]
    async fn test_select_client_checks_existence() {
        let (db, cart) = setup();

        let response = select_client(&db, &cart, "c2").await.unwrap();
        assert_eq!(response.client_id.as_deref(), Some("c2"));

        let err = select_client(&db, &cart, "c9").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(get_cart(&cart).client_id.as_deref(), Some("c2"));

        let response = set_payment_method(&cart, PaymentMethod::Fiado);
        assert_eq!(response.payment_method, PaymentMethod::Fiado);
    }
}
