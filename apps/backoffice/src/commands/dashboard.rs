//! # Dashboard Command
//!
//! ```text
//! ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────┐
//! │  Sold today      │ │  Revenue         │ │  Low stock       │
//! │  R$ 1.240,00     │ │  R$ 58.930,10    │ │  3 products      │
//! └──────────────────┘ └──────────────────┘ └──────────────────┘
//!   first N low-stock products (N from ConfigState)
//! ```

use chrono::{NaiveDate, Utc};
use tracing::debug;

use construflow_core::dashboard::DashboardSummary;

use crate::error::ApiResult;
use crate::state::{ConfigState, DbState};

/// Headline metrics for `today` (a UTC calendar date).
pub async fn dashboard_for(
    db: &DbState,
    config: &ConfigState,
    today: NaiveDate,
) -> ApiResult<DashboardSummary> {
    debug!(today = %today, "dashboard command");

    let sales = db.inner().sales().list_or_default().await;
    let products = db.inner().products().list_or_default().await;

    Ok(DashboardSummary::compute(
        &sales,
        &products,
        today,
        config.low_stock_preview,
    ))
}

/// Headline metrics for the current UTC date.
pub async fn get_dashboard(db: &DbState, config: &ConfigState) -> ApiResult<DashboardSummary> {
    dashboard_for(db, config, Utc::now().date_naive()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use construflow_core::{Money, Quantity};
    use construflow_db::Database;

    use crate::commands::cart::{add_to_cart, select_client};
    use crate::commands::inventory::set_stock;
    use crate::commands::sale::finish_sale;
    use crate::state::CartState;

    #[tokio::test]
    async fn test_dashboard_after_a_sale() {
        let db = DbState::new(Database::in_memory());
        let config = ConfigState {
            low_stock_preview: 1,
            ..ConfigState::default()
        };

        let cart = CartState::new();
        add_to_cart(&db, &cart, "1", Some(Quantity::from_whole(2))).await.unwrap();
        select_client(&db, &cart, "c1").await.unwrap();
        finish_sale(&db, &cart).await.unwrap().unwrap();

        set_stock(&db, "2", Quantity::zero()).await.unwrap();
        set_stock(&db, "3", Quantity::zero()).await.unwrap();

        let summary = get_dashboard(&db, &config).await.unwrap();
        assert_eq!(summary.sold_today, Money::from_cents(7_000));
        assert_eq!(summary.sales_today, 1);
        assert_eq!(summary.total_revenue, Money::from_cents(7_000));
        assert_eq!(summary.low_stock_count, 2);
        assert_eq!(summary.low_stock.len(), 1);

        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        let past = dashboard_for(&db, &config, yesterday).await.unwrap();
        assert_eq!(past.sold_today, Money::zero());
        assert_eq!(past.total_revenue, Money::from_cents(7_000));
    }
}
