//! Reversal and adjustment engine.
//!
//! Two ways to correct a posted event without touching amounts in place:
//! reverse the whole reference (optionally reposting, see
//! [`LedgerService::repost`]), or post a delta-only group on top of it.

use chrono::Utc;
use ledgerline_shared::types::{is_effectively_zero, round_money};
use rust_decimal::Decimal;
use tracing::{debug, error, info};

use super::error::LedgerError;
use super::service::LedgerService;
use super::store::{LedgerStore, WriteMode};
use super::types::{AccountPair, FieldPatch, PostedGroup, PostingKind, PostingLine, PostingMetadata, ReferenceKey};

impl<S: LedgerStore> LedgerService<S> {
    /// Marks every live entry of the reference as reversed.
    ///
    /// Idempotent: a reference with no live entries reverses nothing.
    /// Returns the number of entries newly reversed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn reverse_by_reference(&self, reference: &ReferenceKey) -> Result<u64, LedgerError> {
        let reversed = self.store().reverse_reference(reference, Utc::now()).await?;
        if reversed == 0 {
            debug!(%reference, "nothing to reverse");
        } else {
            info!(%reference, reversed, "ledger entries reversed");
        }
        Ok(reversed)
    }

    /// Updates date, party, document number or description on the live
    /// entries of a reference. Amounts are never touched.
    ///
    /// The party is only rewritten on entries that already carry one, and
    /// only with a party of the same kind: a customer's receivable lines never
    /// move to a supplier. Returns the number of entries updated; an empty
    /// patch updates nothing.
    ///
    /// # Errors
    ///
    /// Returns `PartyKindMismatch` for a cross-kind party, or a store error.
    pub async fn update_live_entries(
        &self,
        reference: &ReferenceKey,
        patch: &FieldPatch,
    ) -> Result<u64, LedgerError> {
        if patch.is_empty() {
            return Ok(0);
        }
        if patch.party.is_some() {
            let live = self.store().entries_for_reference(reference, false).await?;
            let tagged = live.iter().filter_map(|e| e.party);
            if let Err(err) = patch.check_party_kind(reference, tagged) {
                error!(%reference, error = %err, "party patch rejected");
                return Err(err);
            }
        }
        let updated = self.store().patch_live_entries(reference, patch).await?;
        info!(%reference, updated, "live ledger entries updated");
        Ok(updated)
    }

    /// Posts the difference between two amounts of the event in `metadata.reference`.
    ///
    /// A positive delta debits `pair.debit` and credits `pair.credit`; a
    /// negative delta posts the mirror. Deltas under one cent post nothing and
    /// return `None`. Existing groups of the reference are left untouched.
    ///
    /// # Errors
    ///
    /// Same as [`post`](Self::post), except `DuplicatePosting`.
    pub async fn post_delta(
        &self,
        old_amount: Decimal,
        new_amount: Decimal,
        pair: &AccountPair,
        metadata: PostingMetadata,
    ) -> Result<Option<PostedGroup>, LedgerError> {
        let lines = delta_lines(old_amount, new_amount, pair);
        if lines.is_empty() {
            debug!(reference = %metadata.reference, "delta below tolerance, nothing posted");
            return Ok(None);
        }
        self.write(lines, metadata, WriteMode::Adjustment, PostingKind::Adjustment)
            .await
            .map(Some)
    }
}

/// Lines for a delta adjustment; empty when the delta is under one cent.
#[must_use]
pub fn delta_lines(old_amount: Decimal, new_amount: Decimal, pair: &AccountPair) -> Vec<PostingLine> {
    let delta = round_money(new_amount - old_amount);
    if is_effectively_zero(delta) {
        return Vec::new();
    }

    let amount = delta.abs();
    if delta > Decimal::ZERO {
        vec![
            PostingLine::debit(pair.debit.clone(), amount),
            PostingLine::credit(pair.credit.clone(), amount),
        ]
    } else {
        vec![
            PostingLine::debit(pair.credit.clone(), amount),
            PostingLine::credit(pair.debit.clone(), amount),
        ]
    }
}
