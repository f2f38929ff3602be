//! Ledger domain types for posting and correcting entries.
//!
//! This module defines the value objects originating modules hand to the
//! ledger: reference keys, posting metadata, posting lines and field patches.

use chrono::NaiveDate;
use ledgerline_shared::types::{TransactionId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::LedgerEntry;
use super::error::LedgerError;
use crate::chart::Party;

/// Kind of business event a posting group originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// Retail or wholesale sale.
    Sale,
    /// Goods returned by a customer.
    SaleReturn,
    /// Supplier invoice.
    PurchaseInvoice,
    /// Goods returned to a supplier.
    PurchaseReturn,
    /// Cash received.
    CashReceipt,
    /// Cash paid out.
    CashPayment,
    /// Bank deposit received.
    BankReceipt,
    /// Bank payment made.
    BankPayment,
    /// Operating expense.
    Expense,
    /// Manual adjustment.
    Adjustment,
    /// Customer opening balance.
    CustomerOpeningBalance,
    /// Supplier opening balance.
    SupplierOpeningBalance,
}

impl ReferenceType {
    /// Every reference type.
    pub const ALL: [Self; 12] = [
        Self::Sale,
        Self::SaleReturn,
        Self::PurchaseInvoice,
        Self::PurchaseReturn,
        Self::CashReceipt,
        Self::CashPayment,
        Self::BankReceipt,
        Self::BankPayment,
        Self::Expense,
        Self::Adjustment,
        Self::CustomerOpeningBalance,
        Self::SupplierOpeningBalance,
    ];

    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::SaleReturn => "sale_return",
            Self::PurchaseInvoice => "purchase_invoice",
            Self::PurchaseReturn => "purchase_return",
            Self::CashReceipt => "cash_receipt",
            Self::CashPayment => "cash_payment",
            Self::BankReceipt => "bank_receipt",
            Self::BankPayment => "bank_payment",
            Self::Expense => "expense",
            Self::Adjustment => "adjustment",
            Self::CustomerOpeningBalance => "customer_opening_balance",
            Self::SupplierOpeningBalance => "supplier_opening_balance",
        }
    }
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReferenceType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LedgerError::Store(format!("unknown reference type: {s}")))
    }
}

/// Identifies the business event that owns a set of ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceKey {
    /// Kind of originating event.
    pub reference_type: ReferenceType,
    /// Id of the originating record.
    pub reference_id: String,
}

impl ReferenceKey {
    /// Creates a reference key.
    #[must_use]
    pub fn new(reference_type: ReferenceType, reference_id: impl Into<String>) -> Self {
        Self {
            reference_type,
            reference_id: reference_id.into(),
        }
    }

    /// Returns true if the reference id is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.reference_id.trim().is_empty()
    }
}

impl std::fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.reference_type, self.reference_id)
    }
}

/// Status of a ledger entry. Only completed entries count toward balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Posted and effective.
    Completed,
    /// Recorded but not yet effective.
    Pending,
    /// Voided; amounts may be zero.
    Void,
}

/// Whether a group is the principal posting of its reference or a delta on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingKind {
    /// The principal group. At most one live original group per reference.
    Original,
    /// A delta-only correcting group.
    Adjustment,
}

/// Metadata shared by every entry of a posting group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingMetadata {
    /// The owning business event.
    pub reference: ReferenceKey,
    /// Human-facing document number (invoice no., receipt no.).
    pub reference_number: Option<String>,
    /// Accounting date.
    pub transaction_date: NaiveDate,
    /// Group description, used for lines without their own.
    pub description: String,
    /// Party stamped on every line that does not override it.
    pub party: Option<Party>,
    /// Author of the posting.
    pub created_by: UserId,
    /// Currency code; the ledger default applies when `None`.
    pub currency: Option<String>,
}

impl PostingMetadata {
    /// Creates metadata with no party, document number or currency override.
    #[must_use]
    pub fn new(reference: ReferenceKey, transaction_date: NaiveDate, created_by: UserId) -> Self {
        Self {
            description: reference.to_string(),
            reference,
            reference_number: None,
            transaction_date,
            party: None,
            created_by,
            currency: None,
        }
    }

    /// Sets the party.
    #[must_use]
    pub fn with_party(mut self, party: Party) -> Self {
        self.party = Some(party);
        self
    }

    /// Sets the document number.
    #[must_use]
    pub fn with_reference_number(mut self, number: impl Into<String>) -> Self {
        self.reference_number = Some(number.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}

/// One debit or credit line of a posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingLine {
    /// Target account code.
    pub account_code: String,
    /// Debit amount (zero on credit lines).
    pub debit: Decimal,
    /// Credit amount (zero on debit lines).
    pub credit: Decimal,
    /// Line description; the group description applies when `None`.
    pub description: Option<String>,
    /// Party override for this line.
    pub party: Option<Party>,
}

impl PostingLine {
    /// A debit line.
    #[must_use]
    pub fn debit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
            party: None,
        }
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
            party: None,
        }
    }

    /// Sets the line description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Tags this line with a party other than the group's.
    #[must_use]
    pub fn with_party(mut self, party: Party) -> Self {
        self.party = Some(party);
        self
    }
}

/// In-place correctable fields of live entries. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPatch {
    /// New accounting date.
    pub transaction_date: Option<NaiveDate>,
    /// New party tag. Only applied to entries that already carry a party.
    pub party: Option<Party>,
    /// New document number.
    pub reference_number: Option<String>,
    /// New description.
    pub description: Option<String>,
}

impl FieldPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transaction_date.is_none()
            && self.party.is_none()
            && self.reference_number.is_none()
            && self.description.is_none()
    }

    /// Checks that the patched party keeps the kind of the parties already
    /// tagged on `reference`'s live entries.
    ///
    /// # Errors
    ///
    /// Returns `PartyKindMismatch` if any tagged entry belongs to the other kind.
    pub fn check_party_kind(
        &self,
        reference: &ReferenceKey,
        tagged: impl IntoIterator<Item = Party>,
    ) -> Result<(), LedgerError> {
        let Some(requested) = self.party else {
            return Ok(());
        };
        match tagged.into_iter().find(|p| p.kind() != requested.kind()) {
            Some(existing) => Err(LedgerError::PartyKindMismatch {
                reference: reference.clone(),
                tagged: existing.kind(),
                requested: requested.kind(),
            }),
            None => Ok(()),
        }
    }
}

/// Debit/credit accounts for a delta adjustment with a positive delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPair {
    /// Account debited when the amount grows.
    pub debit: String,
    /// Account credited when the amount grows.
    pub credit: String,
}

impl AccountPair {
    /// Creates an account pair.
    #[must_use]
    pub fn new(debit: impl Into<String>, credit: impl Into<String>) -> Self {
        Self {
            debit: debit.into(),
            credit: credit.into(),
        }
    }
}

/// Inclusive date bounds. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// First included date.
    pub from: Option<NaiveDate>,
    /// Last included date.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// All dates.
    #[must_use]
    pub const fn all() -> Self {
        Self { from: None, to: None }
    }

    /// Everything up to and including `as_of`, or all dates when `None`.
    #[must_use]
    pub const fn as_of(as_of: Option<NaiveDate>) -> Self {
        Self { from: None, to: as_of }
    }

    /// `[from, to]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from` is after `to`.
    pub fn between(from: NaiveDate, to: NaiveDate) -> Result<Self, LedgerError> {
        if from > to {
            return Err(LedgerError::InvalidDateRange { start: from, end: to });
        }
        Ok(Self {
            from: Some(from),
            to: Some(to),
        })
    }

    /// Everything strictly before `date`, or `None` when no date precedes it.
    #[must_use]
    pub fn before(date: NaiveDate) -> Option<Self> {
        date.pred_opt().map(|to| Self {
            from: None,
            to: Some(to),
        })
    }

    /// Returns true if `date` falls within the bounds.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Debit and credit totals of a posting group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotals {
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
}

/// Result of a successful posting.
#[derive(Debug, Clone)]
pub struct PostedGroup {
    /// Id shared by every written entry.
    pub transaction_id: TransactionId,
    /// The written entries.
    pub entries: Vec<LedgerEntry>,
    /// Group totals.
    pub totals: GroupTotals,
    /// Entries reversed in the same unit (non-zero only for reposts).
    pub reversed: u64,
}
