//! Party opening balances.
//!
//! An opening balance is posted against the party's subsidiary account and
//! Opening Balance Equity, referenced by the party id. Changing it reverses
//! the previous posting and writes the new one in the same unit.

use chrono::{NaiveDate, Utc};
use ledgerline_shared::types::{UserId, is_effectively_zero, round_money};
use rust_decimal::Decimal;
use tracing::info;

use super::error::LedgerError;
use super::service::LedgerService;
use super::store::{LedgerStore, WriteMode};
use super::types::{PostedGroup, PostingKind, PostingLine, PostingMetadata, ReferenceKey, ReferenceType};
use crate::chart::{AccountMap, AccountRole, Party};

/// Result of setting an opening balance.
#[derive(Debug, Clone)]
pub struct OpeningBalanceOutcome {
    /// Entries of the previous opening balance reversed.
    pub reversed: u64,
    /// The new group, absent when the new amount is zero.
    pub posted: Option<PostedGroup>,
}

/// Reference under which a party's opening balance is posted.
#[must_use]
pub fn opening_reference(party: Party) -> ReferenceKey {
    let reference_type = match party {
        Party::Customer(_) => ReferenceType::CustomerOpeningBalance,
        Party::Supplier(_) => ReferenceType::SupplierOpeningBalance,
    };
    ReferenceKey::new(reference_type, party.id().to_string())
}

/// Lines for an opening balance of `amount` (non-zero).
///
/// - Customer, positive: Dr AR / Cr Opening Balance Equity
/// - Supplier, positive: Dr Opening Balance Equity / Cr AP
/// - Negative amounts (advances in the party's favour) post the mirror
#[must_use]
pub fn opening_lines(accounts: &AccountMap, party: Party, amount: Decimal) -> Vec<PostingLine> {
    let subsidiary = accounts.subsidiary_for(party.kind());
    let equity = accounts.code(AccountRole::OpeningBalanceEquity);

    let (debit, credit) = match party {
        Party::Customer(_) => (subsidiary, equity),
        Party::Supplier(_) => (equity, subsidiary),
    };
    let (debit, credit) = if amount < Decimal::ZERO {
        (credit, debit)
    } else {
        (debit, credit)
    };

    let amount = amount.abs();
    vec![
        PostingLine::debit(debit, amount),
        PostingLine::credit(credit, amount),
    ]
}

impl<S: LedgerStore> LedgerService<S> {
    /// Sets a party's opening balance, replacing any previous one.
    ///
    /// Positive amounts mean the customer owes the business or the business owes
    /// the supplier. A zero amount only reverses the previous posting.
    ///
    /// # Errors
    ///
    /// Same as [`post`](Self::post), except `DuplicatePosting`.
    pub async fn set_party_opening_balance(
        &self,
        party: Party,
        amount: Decimal,
        as_of: NaiveDate,
        created_by: UserId,
    ) -> Result<OpeningBalanceOutcome, LedgerError> {
        let reference = opening_reference(party);
        let amount = round_money(amount);

        if is_effectively_zero(amount) {
            let reversed = self.store().reverse_reference(&reference, Utc::now()).await?;
            info!(%party, reversed, "party opening balance cleared");
            return Ok(OpeningBalanceOutcome {
                reversed,
                posted: None,
            });
        }

        let metadata = PostingMetadata::new(reference, as_of, created_by)
            .with_party(party)
            .with_description(format!("Opening balance for {party}"));
        let lines = opening_lines(self.accounts(), party, amount);

        let posted = self
            .write(lines, metadata, WriteMode::Replace, PostingKind::Original)
            .await?;

        Ok(OpeningBalanceOutcome {
            reversed: posted.reversed,
            posted: Some(posted),
        })
    }
}
