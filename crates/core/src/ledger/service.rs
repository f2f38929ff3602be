//! Ledger service: the posting engine.
//!
//! The service is the only writer of ledger rows. It validates posting lines
//! against the chart, builds one balanced group under a fresh transaction id
//! and hands it to the store, which writes it atomically together with the
//! account balance cache refresh.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use ledgerline_shared::types::{LedgerEntryId, TransactionId};
use tracing::{error, info, instrument};

use super::entry::LedgerEntry;
use super::error::LedgerError;
use super::store::{GroupWrite, LedgerStore, WriteMode};
use super::types::{
    EntryStatus, PostedGroup, PostingKind, PostingLine, PostingMetadata, ReferenceKey,
};
use super::validation::{normalize_lines, validate_posting};
use crate::chart::{Account, AccountMap};

/// Ledger service generic over its store.
///
/// Cloning is cheap: the store is shared behind an `Arc`.
pub struct LedgerService<S> {
    store: Arc<S>,
    accounts: AccountMap,
    default_currency: String,
}

impl<S> Clone for LedgerService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            accounts: self.accounts.clone(),
            default_currency: self.default_currency.clone(),
        }
    }
}

impl<S: LedgerStore> LedgerService<S> {
    /// Creates a ledger service.
    #[must_use]
    pub fn new(store: Arc<S>, accounts: AccountMap, default_currency: impl Into<String>) -> Self {
        Self {
            store,
            accounts,
            default_currency: default_currency.into(),
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The resolved role map.
    #[must_use]
    pub fn accounts(&self) -> &AccountMap {
        &self.accounts
    }

    /// Currency stamped on postings that do not name one.
    #[must_use]
    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    /// Posts a balanced group for a business event.
    ///
    /// # Errors
    ///
    /// - `MissingReference` if the reference id is blank
    /// - `InsufficientEntries`, `InvalidEntryShape`, `InvalidAccount`, `UnbalancedGroup`
    ///   if the lines are invalid (nothing is written)
    /// - `DuplicatePosting` if the reference already has a live original group
    /// - `ConcurrencyConflict` if the store aborted the write; retry the whole post
    pub async fn post(
        &self,
        lines: Vec<PostingLine>,
        metadata: PostingMetadata,
    ) -> Result<PostedGroup, LedgerError> {
        self.write(lines, metadata, WriteMode::Original, PostingKind::Original)
            .await
    }

    /// Reverses every live group of the reference and posts `lines` as its new
    /// original group, in one atomic unit.
    ///
    /// Used when the principal amount or the party of an event changes.
    ///
    /// # Errors
    ///
    /// Same as [`post`](Self::post), except `DuplicatePosting`.
    pub async fn repost(
        &self,
        lines: Vec<PostingLine>,
        metadata: PostingMetadata,
    ) -> Result<PostedGroup, LedgerError> {
        self.write(lines, metadata, WriteMode::Replace, PostingKind::Original)
            .await
    }

    /// Returns true if the reference has any live entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn is_posted(&self, reference: &ReferenceKey) -> Result<bool, LedgerError> {
        self.store.has_live_entries(reference).await
    }

    /// History of a reference in insert order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn entries_for_reference(
        &self,
        reference: &ReferenceKey,
        include_reversed: bool,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.store
            .entries_for_reference(reference, include_reversed)
            .await
    }

    #[instrument(skip_all, fields(reference = %metadata.reference, mode = ?mode))]
    pub(crate) async fn write(
        &self,
        lines: Vec<PostingLine>,
        metadata: PostingMetadata,
        mode: WriteMode,
        kind: PostingKind,
    ) -> Result<PostedGroup, LedgerError> {
        if metadata.reference.is_blank() {
            error!(
                reference_type = %metadata.reference.reference_type,
                "posting attempted without a reference id"
            );
            return Err(LedgerError::MissingReference(metadata.reference));
        }

        let lines = normalize_lines(lines);
        let codes: Vec<String> = lines.iter().map(|l| l.account_code.clone()).collect();
        let accounts: HashMap<String, Account> = self
            .store
            .find_accounts(&codes)
            .await?
            .into_iter()
            .map(|a| (a.code.clone(), a))
            .collect();

        let totals = validate_posting(&lines, |code| accounts.get(code)).inspect_err(|err| {
            if err.requires_operator_attention() {
                error!(error = %err, error_code = err.error_code(), "invalid posting rejected");
            }
        })?;

        let transaction_id = TransactionId::new();
        let entries = build_entries(transaction_id, lines, &metadata, kind, &self.default_currency);

        let reversed = self
            .store
            .write_group(GroupWrite {
                reference: metadata.reference.clone(),
                entries: entries.clone(),
                mode,
                written_at: Utc::now(),
            })
            .await?;

        info!(
            %transaction_id,
            entries = entries.len(),
            amount = %totals.debit,
            reversed,
            "ledger group posted"
        );

        Ok(PostedGroup {
            transaction_id,
            entries,
            totals,
            reversed,
        })
    }
}

/// Expands validated lines into ledger rows sharing one transaction id.
fn build_entries(
    transaction_id: TransactionId,
    lines: Vec<PostingLine>,
    metadata: &PostingMetadata,
    kind: PostingKind,
    default_currency: &str,
) -> Vec<LedgerEntry> {
    let created_at = Utc::now();
    let currency = metadata
        .currency
        .clone()
        .unwrap_or_else(|| default_currency.to_string());

    lines
        .into_iter()
        .map(|line| LedgerEntry {
            id: LedgerEntryId::new(),
            transaction_id,
            account_code: line.account_code,
            debit: line.debit,
            credit: line.credit,
            transaction_date: metadata.transaction_date,
            description: line
                .description
                .unwrap_or_else(|| metadata.description.clone()),
            reference: metadata.reference.clone(),
            reference_number: metadata.reference_number.clone(),
            party: line.party.or(metadata.party),
            status: EntryStatus::Completed,
            posting_kind: kind,
            reversed_at: None,
            created_by: metadata.created_by,
            currency: currency.clone(),
            created_at,
        })
        .collect()
}
