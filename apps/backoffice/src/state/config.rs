//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CONSTRUFLOW_*`)
//! 2. Defaults (this file)
//!
//! The database path is resolved separately (see [`crate::database_path`]).
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use serde::{Deserialize, Serialize};

use construflow_core::{Money, LOW_STOCK_PREVIEW};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Store name (shown in the CLI banner and receipts)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// How many low-stock products the dashboard lists
    pub low_stock_preview: usize,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Store: "ConstruFlow"
    /// - Currency: R$
    /// - Dashboard low-stock preview: 5
    fn default() -> Self {
        ConfigState {
            store_name: "ConstruFlow".to_string(),
            currency_symbol: "R$".to_string(),
            low_stock_preview: LOW_STOCK_PREVIEW,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `CONSTRUFLOW_STORE_NAME`: Override store name
    /// - `CONSTRUFLOW_CURRENCY_SYMBOL`: Override currency symbol
    /// - `CONSTRUFLOW_LOW_STOCK_PREVIEW`: Override the dashboard preview size
    pub fn from_env() -> Self {
        let mut config = ConfigState::default();

        if let Ok(store_name) = std::env::var("CONSTRUFLOW_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Ok(symbol) = std::env::var("CONSTRUFLOW_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Ok(preview) = std::env::var("CONSTRUFLOW_LOW_STOCK_PREVIEW") {
            match preview.parse::<usize>() {
                Ok(n) => config.low_stock_preview = n,
                Err(_) => tracing::warn!(value = %preview, "Ignoring invalid CONSTRUFLOW_LOW_STOCK_PREVIEW"),
            }
        }

        config
    }

    /// Formats an amount with the configured symbol and a comma decimal
    /// separator.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "R$ 12,34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        format!(
            "{}{} {},{:02}",
            if amount.is_negative() { "-" } else { "" },
            self.currency_symbol,
            amount.major().abs(),
            amount.cents_part()
        )
    }
}
