//! # Finance Commands
//!
//! Ledger listing, summary, manual entries and settling pending records.
//!
//! The ledger lives under the `finance` key. Listing and the summary are
//! display reads; every write starts from a strict read so a corrupt ledger
//! is never replaced by an empty one.

use tracing::{debug, info};

use construflow_core::finance::{self, FinanceSummary, ManualEntry};
use construflow_core::LedgerRecord;

use crate::error::{ApiError, ApiResult};
use crate::state::DbState;

/// Ledger records, newest first.
pub async fn list_ledger(db: &DbState) -> ApiResult<Vec<LedgerRecord>> {
    debug!("list_ledger command");
    let records = db.inner().ledger().list_or_default().await;
    Ok(finance::newest_first(&records).into_iter().cloned().collect())
}

/// Paid income, paid expense, pending net and balance.
pub async fn finance_summary(db: &DbState) -> ApiResult<FinanceSummary> {
    debug!("finance_summary command");
    let records = db.inner().ledger().list_or_default().await;
    Ok(FinanceSummary::from_records(&records))
}

/// Validates and appends a manual ledger entry.
///
/// ## Errors
/// - `VALIDATION_ERROR` for a blank description or an amount that is not a
///   positive number; nothing is written
pub async fn add_manual_entry(db: &DbState, entry: ManualEntry) -> ApiResult<LedgerRecord> {
    debug!(description = %entry.description, amount = %entry.amount, "add_manual_entry command");

    let record = entry.into_record()?;
    db.inner().ledger().append(record.clone()).await?;

    info!(
        record_id = %record.id,
        kind = ?record.kind,
        amount = record.amount.cents(),
        "Manual ledger entry added"
    );
    Ok(record)
}

/// Flips a pending record to paid. Already-paid records are returned as is.
pub async fn mark_paid(db: &DbState, record_id: &str) -> ApiResult<LedgerRecord> {
    debug!(record_id = %record_id, "mark_paid command");

    let ledger_repo = db.inner().ledger();
    let mut records = ledger_repo.list().await?;

    let changed = finance::mark_paid(&mut records, record_id)?;
    if changed {
        ledger_repo.replace_all(&records).await?;
        info!(record_id = %record_id, "Ledger record marked as paid");
    }

    records
        .into_iter()
        .find(|r| r.id == record_id)
        .ok_or_else(|| ApiError::not_found("Ledger record", record_id))
}

// =============================================================================
// Unit Tests
// =============================================================================
