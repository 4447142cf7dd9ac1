//! # Finance Ledger
//!
//! Summaries over the ledger, manual entries and settlement of pending
//! records (store credit received, bills paid).
//!
//! ## Summary Cards
//! ```text
//! ┌──────────────────┬──────────────────┬──────────────────┬──────────────────┐
//! │  Income (paid)   │  Expense (paid)  │  Balance         │  Pending (net)   │
//! │  Σ paid income   │  Σ paid expense  │  in - out        │  Σ ± pending     │
//! └──────────────────┴──────────────────┴──────────────────┴──────────────────┘
//! ```
//!
//! Amounts are stored unsigned; [`LedgerRecord::signed_amount`] applies the
//! sign from the record type.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{LedgerRecord, LedgerStatus, TransactionType};
use crate::validation::validate_amount;
use crate::DEFAULT_LEDGER_CATEGORY;

/// Prefix for ledger records typed in by hand.
pub const MANUAL_LEDGER_PREFIX: &str = "FIN-MAN-";

// =============================================================================
// Summary
// =============================================================================

/// Headline figures for the finance screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub total_in: Money,
    pub total_out: Money,
    /// Pending income minus pending expense.
    pub pending_net: Money,
    /// `total_in - total_out`
    pub balance: Money,
}

impl FinanceSummary {
    pub fn from_records(records: &[LedgerRecord]) -> Self {
        let mut summary = FinanceSummary::default();

        for record in records {
            match (record.status, record.kind) {
                (LedgerStatus::Paid, TransactionType::Income) => summary.total_in += record.amount,
                (LedgerStatus::Paid, TransactionType::Expense) => summary.total_out += record.amount,
                (LedgerStatus::Pending, _) => summary.pending_net += record.signed_amount(),
            }
        }

        summary.balance = summary.total_in - summary.total_out;
        summary
    }
}

/// Listing order for the ledger table: newest entry first.
///
/// Entries are appended in time order, so this is reverse insertion order.
pub fn newest_first(records: &[LedgerRecord]) -> Vec<&LedgerRecord> {
    records.iter().rev().collect()
}

// =============================================================================
// Manual Entry
// =============================================================================

/// The manual entry form, as typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntry {
    pub description: String,
    /// Raw amount text, e.g. `"1500,00"`.
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub category: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub status: LedgerStatus,
}

impl ManualEntry {
    /// Validates the form and builds the record to append.
    ///
    /// ## Rules
    /// - Description must not be blank
    /// - Amount must parse and be strictly positive
    /// - Blank category becomes [`DEFAULT_LEDGER_CATEGORY`]
    /// - The calendar date is stored as midnight UTC
    pub fn into_record(self) -> Result<LedgerRecord, ValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::required("description"));
        }

        let amount = Money::parse(&self.amount)?;
        validate_amount(amount)?;

        let category = match self.category.trim() {
            "" => DEFAULT_LEDGER_CATEGORY.to_string(),
            other => other.to_string(),
        };

        Ok(LedgerRecord {
            id: format!("{}{}", MANUAL_LEDGER_PREFIX, Uuid::now_v7()),
            kind: self.kind,
            category,
            amount,
            date: midnight_utc(self.date),
            description: description.to_string(),
            status: self.status,
            reference_id: None,
        })
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

// =============================================================================
// Settling Pending Records
// =============================================================================

/// Marks a pending record as paid.
///
/// Returns `Ok(true)` when the record changed and `Ok(false)` when it was
/// already paid, in which case nothing needs to be written.
pub fn mark_paid(records: &mut [LedgerRecord], record_id: &str) -> CoreResult<bool> {
    let record = records
        .iter_mut()
        .find(|r| r.id == record_id)
        .ok_or_else(|| CoreError::LedgerRecordNotFound(record_id.to_string()))?;

    if record.status == LedgerStatus::Paid {
        return Ok(false);
    }

    record.status = LedgerStatus::Paid;
    Ok(true)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, kind: TransactionType, cents: i64, status: LedgerStatus) -> LedgerRecord {
        LedgerRecord {
            id: id.to_string(),
            kind,
            category: "Test".to_string(),
            amount: Money::from_cents(cents),
            date: Utc::now(),
            description: id.to_string(),
            status,
            reference_id: None,
        }
    }

    fn entry(description: &str, amount: &str) -> ManualEntry {
        ManualEntry {
            description: description.to_string(),
            amount: amount.to_string(),
            kind: TransactionType::Expense,
            category: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            status: LedgerStatus::Paid,
        }
    }

    #[test]
    fn test_summary() {
        use LedgerStatus::*;
        use TransactionType::*;

        let records = vec![
            record("a", Income, 10_000, Paid),
            record("b", Income, 5_000, Paid),
            record("c", Expense, 3_000, Paid),
            record("d", Income, 2_000, Pending),
            record("e", Expense, 500, Pending),
        ];

        let summary = FinanceSummary::from_records(&records);
        assert_eq!(summary.total_in.cents(), 15_000);
        assert_eq!(summary.total_out.cents(), 3_000);
        assert_eq!(summary.balance.cents(), 12_000);
        assert_eq!(summary.pending_net.cents(), 1_500);
    }

    #[test]
    fn test_summary_of_empty_ledger() {
        assert_eq!(FinanceSummary::from_records(&[]), FinanceSummary::default());
    }

    #[test]
    fn test_newest_first() {
        let records = vec![
            record("first", TransactionType::Income, 1, LedgerStatus::Paid),
            record("second", TransactionType::Income, 1, LedgerStatus::Paid),
        ];
        let ids: Vec<&str> = newest_first(&records).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[test]
    fn test_manual_entry_builds_record() {
        let mut form = entry("  Shop rent ", "1500,00");
        form.category = "Rent".to_string();

        let record = form.into_record().unwrap();
        assert!(record.id.starts_with(MANUAL_LEDGER_PREFIX));
        assert_eq!(record.description, "Shop rent");
        assert_eq!(record.amount.cents(), 150_000);
        assert_eq!(record.category, "Rent");
        assert_eq!(record.kind, TransactionType::Expense);
        assert_eq!(record.date.to_rfc3339(), "2024-03-15T00:00:00+00:00");
        assert!(record.reference_id.is_none());
    }

    #[test]
    fn test_manual_entry_default_category() {
        let record = entry("Electricity", "230.10").into_record().unwrap();
        assert_eq!(record.category, DEFAULT_LEDGER_CATEGORY);
    }

    #[test]
    fn test_manual_entry_rejections() {
        assert_eq!(
            entry("   ", "10").into_record().unwrap_err(),
            ValidationError::required("description")
        );
        assert_eq!(
            entry("Rent", "0").into_record().unwrap_err(),
            ValidationError::must_be_positive("amount")
        );
        assert!(entry("Rent", "-5").into_record().is_err());
        assert!(entry("Rent", "abc").into_record().is_err());
        assert!(entry("Rent", "").into_record().is_err());
    }

    #[test]
    fn test_mark_paid() {
        let mut records = vec![record("p", TransactionType::Income, 900, LedgerStatus::Pending)];

        assert!(mark_paid(&mut records, "p").unwrap());
        assert_eq!(records[0].status, LedgerStatus::Paid);

        // already paid
        assert!(!mark_paid(&mut records, "p").unwrap());

        assert!(matches!(
            mark_paid(&mut records, "missing"),
            Err(CoreError::LedgerRecordNotFound(_))
        ));
    }
}
