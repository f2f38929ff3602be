//! Ledger error types.
//!
//! Validation failures, account errors and store failures raised by the
//! posting, reversal and balance engines. Reconciliation discrepancies are
//! reported findings, not errors.

use chrono::NaiveDate;
use ledgerline_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::ReferenceKey;
use crate::chart::{ChartError, Party, PartyKind};

/// Why an account cannot take a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRejection {
    /// No account with the code exists.
    NotFound,
    /// The account is deactivated.
    Inactive,
    /// The account is a header that forbids direct posting.
    NoDirectPosting,
}

impl std::fmt::Display for AccountRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not found",
            Self::Inactive => "inactive",
            Self::NoDirectPosting => "does not allow direct posting",
        })
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Posting has fewer than 2 lines.
    #[error("Posting must have at least 2 entries")]
    InsufficientEntries,

    /// Debits and credits differ by at least one cent.
    #[error("Posting group is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedGroup {
        /// Total debits.
        debit: Decimal,
        /// Total credits.
        credit: Decimal,
    },

    /// A line does not carry exactly one positive side.
    #[error("Entry {line} must have exactly one of debit or credit greater than zero")]
    InvalidEntryShape {
        /// Zero-based line index.
        line: usize,
    },

    /// An account cannot take the posting.
    #[error("Account {code} {reason}")]
    InvalidAccount {
        /// The account code.
        code: String,
        /// Why it was rejected.
        reason: AccountRejection,
    },

    /// The reference id is blank.
    #[error("Posting has no reference id ({0})")]
    MissingReference(ReferenceKey),

    /// A live original group already exists for the reference.
    #[error("Reference {0} is already posted")]
    DuplicatePosting(ReferenceKey),

    /// A party patch would move entries to a party of the other kind.
    #[error("Reference {reference} is tagged with a {tagged}, cannot move it to a {requested}")]
    PartyKindMismatch {
        /// The patched reference.
        reference: ReferenceKey,
        /// Kind already carried by the live entries.
        tagged: PartyKind,
        /// Kind of the party in the patch.
        requested: PartyKind,
    },

    /// Start date after end date.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    // ========== Read Errors ==========
    /// Account lookup failed on the read side.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Party has no record in the balance cache.
    #[error("Party not found: {0}")]
    PartyNotFound(Party),

    // ========== Configuration Errors ==========
    /// Role map could not be resolved.
    #[error(transparent)]
    Chart(#[from] ChartError),

    // ========== Concurrency Errors ==========
    /// Serialization failure or deadlock; retry the whole operation.
    #[error("Concurrent modification detected, please retry")]
    ConcurrencyConflict,

    // ========== Store Errors ==========
    /// Persistence failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientEntries => "INSUFFICIENT_ENTRIES",
            Self::UnbalancedGroup { .. } => "UNBALANCED_GROUP",
            Self::InvalidEntryShape { .. } => "INVALID_ENTRY_SHAPE",
            Self::InvalidAccount { .. } => "INVALID_ACCOUNT",
            Self::MissingReference(_) => "MISSING_REFERENCE",
            Self::DuplicatePosting(_) => "DUPLICATE_POSTING",
            Self::PartyKindMismatch { .. } => "PARTY_KIND_MISMATCH",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::Chart(_) => "CHART_ERROR",
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns true if the whole operation may be retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict)
    }

    /// Returns true for errors that indicate a bug in a calling module or a
    /// misconfigured chart rather than bad user input.
    #[must_use]
    pub const fn requires_operator_attention(&self) -> bool {
        matches!(
            self,
            Self::UnbalancedGroup { .. }
                | Self::InvalidAccount { .. }
                | Self::MissingReference(_)
                | Self::InvalidEntryShape { .. }
                | Self::PartyKindMismatch { .. }
                | Self::Chart(_)
        )
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match &err {
            LedgerError::ConcurrencyConflict => {
                return Self::Conflict("ledger is busy, retry the operation".to_string());
            }
            LedgerError::UnbalancedGroup { .. } | LedgerError::InvalidAccount { .. } => {
                tracing::error!(
                    error = %err,
                    error_code = err.error_code(),
                    "ledger posting rejected"
                );
            }
            _ => {
                tracing::warn!(error = %err, error_code = err.error_code(), "ledger operation failed");
            }
        }
        Self::Internal("ledger posting failed".to_string())
    }
}
