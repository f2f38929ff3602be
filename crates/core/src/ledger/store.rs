//! Persistence seams for the ledger engines.
//!
//! These traits are implemented by the db crate for Postgres and by
//! [`InMemoryLedgerStore`](super::memory::InMemoryLedgerStore) for tests.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use ledgerline_shared::types::{PageRequest, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entry::LedgerEntry;
use super::error::LedgerError;
use super::types::{DateRange, FieldPatch, ReferenceKey};
use crate::chart::{Account, Party, PartyKind};

/// How a group write interacts with existing entries of its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fails with `DuplicatePosting` if a live original group exists.
    Original,
    /// Written alongside the existing groups.
    Adjustment,
    /// Reverses every live entry of the reference, then writes the group.
    Replace,
}

/// A balanced group ready to be written.
#[derive(Debug, Clone)]
pub struct GroupWrite {
    /// Owning reference; every entry carries it.
    pub reference: ReferenceKey,
    /// Rows to insert, all sharing one transaction id.
    pub entries: Vec<LedgerEntry>,
    /// Interaction with existing entries.
    pub mode: WriteMode,
    /// Reversal timestamp for `Replace`.
    pub written_at: DateTime<Utc>,
}

/// Debit and credit sums of effective entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
}

impl EntryTotals {
    /// Adds one entry's amounts.
    pub fn add(&mut self, debit: Decimal, credit: Decimal) {
        self.debit += debit;
        self.credit += credit;
    }
}

/// One page of an account's entries, oldest first.
#[derive(Debug, Clone)]
pub struct EntryPage {
    /// Entries on this page.
    pub entries: Vec<LedgerEntry>,
    /// Effective entries in the range.
    pub total: u64,
    /// Totals of entries in the range that precede this page.
    pub carried: EntryTotals,
}

/// Entry counts for one party, used to explain an unexpected balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyCensus {
    /// Live completed entries on the subsidiary account within the date bound.
    pub live_in_range: u64,
    /// Live completed entries on the subsidiary account, any date.
    pub live_total: u64,
    /// Reversed entries on the subsidiary account.
    pub reversed: u64,
    /// Entries on the subsidiary account that are not completed.
    pub not_completed: u64,
    /// Entries tagged with the party on other accounts.
    pub other_accounts: u64,
}

/// A transaction group whose live completed entries do not balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupImbalance {
    /// The group.
    pub transaction_id: TransactionId,
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
}

/// Balance-sheet cache row of one party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedBalance {
    /// Party id.
    pub party_id: Uuid,
    /// Value of the party's `current_balance` column.
    pub balance: Decimal,
}

/// Ledger persistence.
///
/// Every method that writes runs in a single atomic unit and refreshes the
/// cached balance of each affected account from a fresh aggregate before
/// committing.
pub trait LedgerStore: Send + Sync {
    /// Lists the whole chart, active or not.
    fn list_accounts(&self) -> impl Future<Output = Result<Vec<Account>, LedgerError>> + Send;

    /// Finds accounts by code. Missing codes are simply absent from the result.
    fn find_accounts(
        &self,
        codes: &[String],
    ) -> impl Future<Output = Result<Vec<Account>, LedgerError>> + Send;

    /// Writes a group atomically; returns how many entries were reversed first.
    fn write_group(
        &self,
        write: GroupWrite,
    ) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    /// Returns true if any live entry exists for the reference.
    fn has_live_entries(
        &self,
        reference: &ReferenceKey,
    ) -> impl Future<Output = Result<bool, LedgerError>> + Send;

    /// Sets `reversed_at` on every live entry of the reference; returns the count.
    fn reverse_reference(
        &self,
        reference: &ReferenceKey,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    /// Applies a field patch to every live entry of the reference; returns the count.
    fn patch_live_entries(
        &self,
        reference: &ReferenceKey,
        patch: &FieldPatch,
    ) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    /// Entries of a reference in insert order.
    fn entries_for_reference(
        &self,
        reference: &ReferenceKey,
        include_reversed: bool,
    ) -> impl Future<Output = Result<Vec<LedgerEntry>, LedgerError>> + Send;

    /// Totals of effective entries on one account.
    fn account_totals(
        &self,
        account_code: &str,
        range: DateRange,
    ) -> impl Future<Output = Result<EntryTotals, LedgerError>> + Send;

    /// Totals of effective entries per account code, in one aggregate.
    fn totals_by_account(
        &self,
        range: DateRange,
    ) -> impl Future<Output = Result<HashMap<String, EntryTotals>, LedgerError>> + Send;

    /// Totals of effective entries on one account tagged with one party.
    fn party_totals(
        &self,
        account_code: &str,
        party: Party,
        range: DateRange,
    ) -> impl Future<Output = Result<EntryTotals, LedgerError>> + Send;

    /// Totals per party id in one aggregate. Ids without entries are absent.
    fn party_totals_bulk(
        &self,
        account_code: &str,
        kind: PartyKind,
        party_ids: &[Uuid],
        range: DateRange,
    ) -> impl Future<Output = Result<HashMap<Uuid, EntryTotals>, LedgerError>> + Send;

    /// A page of effective entries on one account, ordered by date then insert time.
    fn account_entries(
        &self,
        account_code: &str,
        range: DateRange,
        page: PageRequest,
    ) -> impl Future<Output = Result<EntryPage, LedgerError>> + Send;

    /// Entry counts for one party.
    fn party_census(
        &self,
        account_code: &str,
        party: Party,
        as_of: Option<NaiveDate>,
    ) -> impl Future<Output = Result<PartyCensus, LedgerError>> + Send;

    /// Groups whose live completed entries differ by at least one cent.
    fn unbalanced_groups(
        &self,
    ) -> impl Future<Output = Result<Vec<GroupImbalance>, LedgerError>> + Send;

    /// Live non-void entries without exactly one positive side.
    fn malformed_entries(
        &self,
    ) -> impl Future<Output = Result<Vec<LedgerEntry>, LedgerError>> + Send;
}

/// The denormalized `current_balance` column on customer and supplier records.
pub trait PartyBalanceCache: Send + Sync {
    /// Cached balances of every party of a kind.
    fn cached_balances(
        &self,
        kind: PartyKind,
    ) -> impl Future<Output = Result<Vec<CachedBalance>, LedgerError>> + Send;

    /// Cached balance of one party; `None` if the party does not exist.
    fn cached_balance(
        &self,
        party: Party,
    ) -> impl Future<Output = Result<Option<Decimal>, LedgerError>> + Send;

    /// Overwrites the cached balance with the ledger value.
    fn overwrite_balance(
        &self,
        party: Party,
        balance: Decimal,
    ) -> impl Future<Output = Result<(), LedgerError>> + Send;
}

/// Source records consulted when the ledger has no postings for a period.
pub trait HistoricalSalesSource: Send + Sync {
    /// Net sales and cost of goods sold recorded on sales documents in the range.
    fn sales_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<HistoricalSales, LedgerError>> + Send;
}

/// Sales figures read from source documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalSales {
    /// Net sales revenue.
    pub revenue: Decimal,
    /// Cost of goods sold.
    pub cost_of_goods_sold: Decimal,
}
