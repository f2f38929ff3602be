//! Ledger entry domain type.

use chrono::{DateTime, NaiveDate, Utc};
use ledgerline_shared::types::{LedgerEntryId, TransactionId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{EntryStatus, PostingKind, ReferenceKey};
use crate::chart::Party;

/// A single ledger row.
///
/// Entries are append-only. Amounts never change after insert; a group is
/// corrected by setting `reversed_at` and writing a fresh group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Surrogate id.
    pub id: LedgerEntryId,
    /// Groups the balanced set this entry belongs to.
    pub transaction_id: TransactionId,
    /// Account posted to.
    pub account_code: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Accounting date.
    pub transaction_date: NaiveDate,
    /// Line description.
    pub description: String,
    /// Owning business event.
    pub reference: ReferenceKey,
    /// Human-facing document number.
    pub reference_number: Option<String>,
    /// Customer or supplier tag.
    pub party: Option<Party>,
    /// Entry status.
    pub status: EntryStatus,
    /// Principal group or delta adjustment.
    pub posting_kind: PostingKind,
    /// Set once the entry is reversed; `None` means live.
    pub reversed_at: Option<DateTime<Utc>>,
    /// Author.
    pub created_by: UserId,
    /// Currency code.
    pub currency: String,
    /// Insert time.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns true if the entry has not been reversed.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.reversed_at.is_none()
    }

    /// Returns true if the entry counts toward balances.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.is_live() && self.status == EntryStatus::Completed
    }

    /// Returns true if exactly one side is positive. Void entries are exempt.
    #[must_use]
    pub fn has_valid_shape(&self) -> bool {
        if self.status == EntryStatus::Void {
            return true;
        }
        (self.debit > Decimal::ZERO) != (self.credit > Decimal::ZERO)
            && self.debit >= Decimal::ZERO
            && self.credit >= Decimal::ZERO
    }
}
