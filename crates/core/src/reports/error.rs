//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Fiscal year start month outside 1..=12.
    #[error("Invalid fiscal year start month: {0}")]
    InvalidFiscalYearStart(u32),

    /// Ledger read failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
