//! # Dashboard Metrics
//!
//! The landing screen after login: today's sales, lifetime revenue and the
//! products that need reordering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Product, Sale};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Σ total of sales dated `today` (UTC).
    pub sold_today: Money,
    pub sales_today: usize,
    /// Σ total of every recorded sale.
    pub total_revenue: Money,
    pub low_stock_count: usize,
    /// The first few low-stock products, in catalog order.
    pub low_stock: Vec<Product>,
}

impl DashboardSummary {
    pub fn compute(sales: &[Sale], products: &[Product], today: NaiveDate, preview: usize) -> Self {
        let todays: Vec<&Sale> = sales.iter().filter(|s| s.date.date_naive() == today).collect();
        let low: Vec<&Product> = products.iter().filter(|p| p.is_low_stock()).collect();

        DashboardSummary {
            sold_today: todays.iter().map(|s| s.total).sum(),
            sales_today: todays.len(),
            total_revenue: sales.iter().map(|s| s.total).sum(),
            low_stock_count: low.len(),
            low_stock: low.into_iter().take(preview).cloned().collect(),
        }
    }
}
