//! In-memory ledger store.
//!
//! Implements [`LedgerStore`] and [`PartyBalanceCache`] over a mutex-guarded
//! state. Used by engine tests and by callers that need a throwaway ledger.
//! Fault injection hooks let tests exercise per-party failure isolation.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use ledgerline_shared::types::{PageRequest, TransactionId, within_tolerance};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::entry::LedgerEntry;
use super::error::{AccountRejection, LedgerError};
use super::store::{
    CachedBalance, EntryPage, EntryTotals, GroupImbalance, GroupWrite, LedgerStore,
    PartyBalanceCache, PartyCensus, WriteMode,
};
use super::types::{DateRange, EntryStatus, FieldPatch, PostingKind, ReferenceKey};
use crate::chart::{Account, Party, PartyKind, standard_chart};

#[derive(Debug, Default)]
struct MemoryState {
    accounts: BTreeMap<String, Account>,
    account_cache: HashMap<String, Decimal>,
    entries: Vec<LedgerEntry>,
    customers: BTreeMap<Uuid, Decimal>,
    suppliers: BTreeMap<Uuid, Decimal>,
    failing_parties: HashSet<Uuid>,
    fail_bulk: bool,
}

impl MemoryState {
    fn parties(&self, kind: PartyKind) -> &BTreeMap<Uuid, Decimal> {
        match kind {
            PartyKind::Customer => &self.customers,
            PartyKind::Supplier => &self.suppliers,
        }
    }

    fn parties_mut(&mut self, kind: PartyKind) -> &mut BTreeMap<Uuid, Decimal> {
        match kind {
            PartyKind::Customer => &mut self.customers,
            PartyKind::Supplier => &mut self.suppliers,
        }
    }

    fn live_for<'a>(&'a self, reference: &'a ReferenceKey) -> impl Iterator<Item = &'a LedgerEntry> {
        self.entries
            .iter()
            .filter(move |e| e.is_live() && &e.reference == reference)
    }

    fn effective_on<'a>(
        &'a self,
        account_code: &'a str,
        range: DateRange,
    ) -> impl Iterator<Item = &'a LedgerEntry> {
        self.entries.iter().filter(move |e| {
            e.is_effective() && e.account_code == account_code && range.contains(e.transaction_date)
        })
    }

    fn refresh_account_cache(&mut self, codes: &HashSet<String>) {
        for code in codes {
            let Some(account) = self.accounts.get(code) else {
                continue;
            };
            let totals = totals_of(self.effective_on(code, DateRange::all()));
            let balance = account.balance_from(totals.debit, totals.credit);
            self.account_cache.insert(code.clone(), balance);
        }
    }

    fn reverse_live(&mut self, reference: &ReferenceKey, at: DateTime<Utc>) -> (u64, HashSet<String>) {
        let mut count = 0;
        let mut touched = HashSet::new();
        for entry in &mut self.entries {
            if entry.is_live() && &entry.reference == reference {
                entry.reversed_at = Some(at);
                touched.insert(entry.account_code.clone());
                count += 1;
            }
        }
        (count, touched)
    }
}

fn totals_of<'a>(entries: impl Iterator<Item = &'a LedgerEntry>) -> EntryTotals {
    let mut totals = EntryTotals::default();
    for entry in entries {
        totals.add(entry.debit, entry.credit);
    }
    totals
}

/// Mutex-guarded in-memory ledger with customer and supplier balance caches.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<MemoryState>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store provisioned with `chart`.
    #[must_use]
    pub fn with_chart(chart: Vec<Account>) -> Self {
        let state = MemoryState {
            accounts: chart.into_iter().map(|a| (a.code.clone(), a)).collect(),
            ..MemoryState::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Creates a store provisioned with the standard retail chart.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_chart(standard_chart())
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Store("in-memory ledger lock poisoned".to_string()))
    }

    /// Registers a party record with a cached balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn add_party(&self, party: Party, cached_balance: Decimal) -> Result<(), LedgerError> {
        self.state()?
            .parties_mut(party.kind())
            .insert(party.id(), cached_balance);
        Ok(())
    }

    /// Cached balance column of an account, as last refreshed by a write.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn cached_account_balance(&self, code: &str) -> Result<Option<Decimal>, LedgerError> {
        Ok(self.state()?.account_cache.get(code).copied())
    }

    /// Deactivates an account. Existing entries are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist or the lock is poisoned.
    pub fn deactivate_account(&self, code: &str) -> Result<(), LedgerError> {
        let mut state = self.state()?;
        let account = state
            .accounts
            .get_mut(code)
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))?;
        account.is_active = false;
        Ok(())
    }

    /// Appends a row without validation, for integrity-check tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn insert_unchecked(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        self.state()?.entries.push(entry);
        Ok(())
    }

    /// Makes every balance query for `party_id` fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn fail_party(&self, party_id: Uuid) -> Result<(), LedgerError> {
        self.state()?.failing_parties.insert(party_id);
        Ok(())
    }

    /// Makes bulk party aggregates fail while single-party queries still work.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn fail_bulk_queries(&self, fail: bool) -> Result<(), LedgerError> {
        self.state()?.fail_bulk = fail;
        Ok(())
    }

    /// Snapshot of every row, reversed or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn all_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.state()?.entries.clone())
    }
}

impl LedgerStore for InMemoryLedgerStore {
    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.state()?.accounts.values().cloned().collect())
    }

    async fn find_accounts(&self, codes: &[String]) -> Result<Vec<Account>, LedgerError> {
        let state = self.state()?;
        Ok(codes
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|code| state.accounts.get(code).cloned())
            .collect())
    }

    async fn write_group(&self, write: GroupWrite) -> Result<u64, LedgerError> {
        let mut state = self.state()?;

        // Same checks the database store repeats under row locks.
        for entry in &write.entries {
            let reason = match state.accounts.get(&entry.account_code) {
                None => Some(AccountRejection::NotFound),
                Some(a) if !a.is_active => Some(AccountRejection::Inactive),
                Some(a) if !a.allow_direct_posting => Some(AccountRejection::NoDirectPosting),
                Some(_) => None,
            };
            if let Some(reason) = reason {
                return Err(LedgerError::InvalidAccount {
                    code: entry.account_code.clone(),
                    reason,
                });
            }
        }

        let mut touched: HashSet<String> =
            write.entries.iter().map(|e| e.account_code.clone()).collect();
        let mut reversed = 0;

        match write.mode {
            WriteMode::Original => {
                let duplicate = state
                    .live_for(&write.reference)
                    .any(|e| e.posting_kind == PostingKind::Original);
                if duplicate {
                    return Err(LedgerError::DuplicatePosting(write.reference));
                }
            }
            WriteMode::Adjustment => {}
            WriteMode::Replace => {
                let (count, codes) = state.reverse_live(&write.reference, write.written_at);
                reversed = count;
                touched.extend(codes);
            }
        }

        state.entries.extend(write.entries);
        state.refresh_account_cache(&touched);
        Ok(reversed)
    }

    async fn has_live_entries(&self, reference: &ReferenceKey) -> Result<bool, LedgerError> {
        Ok(self.state()?.live_for(reference).next().is_some())
    }

    async fn reverse_reference(
        &self,
        reference: &ReferenceKey,
        at: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        let mut state = self.state()?;
        let (count, touched) = state.reverse_live(reference, at);
        state.refresh_account_cache(&touched);
        Ok(count)
    }

    async fn patch_live_entries(
        &self,
        reference: &ReferenceKey,
        patch: &FieldPatch,
    ) -> Result<u64, LedgerError> {
        let mut state = self.state()?;
        patch.check_party_kind(
            reference,
            state.live_for(reference).filter_map(|e| e.party),
        )?;
        let mut count = 0;
        for entry in &mut state.entries {
            if !entry.is_live() || &entry.reference != reference {
                continue;
            }
            if let Some(date) = patch.transaction_date {
                entry.transaction_date = date;
            }
            if let Some(party) = patch.party
                && entry.party.is_some()
            {
                entry.party = Some(party);
            }
            if let Some(number) = &patch.reference_number {
                entry.reference_number = Some(number.clone());
            }
            if let Some(description) = &patch.description {
                entry.description.clone_from(description);
            }
            count += 1;
        }
        Ok(count)
    }

    async fn entries_for_reference(
        &self,
        reference: &ReferenceKey,
        include_reversed: bool,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self
            .state()?
            .entries
            .iter()
            .filter(|e| &e.reference == reference && (include_reversed || e.is_live()))
            .cloned()
            .collect())
    }

    async fn account_totals(
        &self,
        account_code: &str,
        range: DateRange,
    ) -> Result<EntryTotals, LedgerError> {
        Ok(totals_of(self.state()?.effective_on(account_code, range)))
    }

    async fn totals_by_account(
        &self,
        range: DateRange,
    ) -> Result<HashMap<String, EntryTotals>, LedgerError> {
        let state = self.state()?;
        let mut totals: HashMap<String, EntryTotals> = HashMap::new();
        for entry in state
            .entries
            .iter()
            .filter(|e| e.is_effective() && range.contains(e.transaction_date))
        {
            totals
                .entry(entry.account_code.clone())
                .or_default()
                .add(entry.debit, entry.credit);
        }
        Ok(totals)
    }

    async fn party_totals(
        &self,
        account_code: &str,
        party: Party,
        range: DateRange,
    ) -> Result<EntryTotals, LedgerError> {
        let state = self.state()?;
        if state.failing_parties.contains(&party.id()) {
            return Err(LedgerError::Store(format!("injected failure for {party}")));
        }
        Ok(totals_of(
            state
                .effective_on(account_code, range)
                .filter(|e| e.party == Some(party)),
        ))
    }

    async fn party_totals_bulk(
        &self,
        account_code: &str,
        kind: PartyKind,
        party_ids: &[Uuid],
        range: DateRange,
    ) -> Result<HashMap<Uuid, EntryTotals>, LedgerError> {
        let state = self.state()?;
        if state.fail_bulk {
            return Err(LedgerError::Store("injected bulk aggregate failure".to_string()));
        }
        let wanted: HashSet<&Uuid> = party_ids.iter().collect();
        let mut totals: HashMap<Uuid, EntryTotals> = HashMap::new();
        for entry in state.effective_on(account_code, range) {
            let Some(party) = entry.party.filter(|p| p.kind() == kind) else {
                continue;
            };
            if wanted.contains(&party.id()) {
                totals
                    .entry(party.id())
                    .or_default()
                    .add(entry.debit, entry.credit);
            }
        }
        Ok(totals)
    }

    async fn account_entries(
        &self,
        account_code: &str,
        range: DateRange,
        page: PageRequest,
    ) -> Result<EntryPage, LedgerError> {
        let state = self.state()?;
        let mut rows: Vec<&LedgerEntry> = state.effective_on(account_code, range).collect();
        rows.sort_by_key(|e| (e.transaction_date, e.created_at, e.id));

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let carried = totals_of(rows.iter().take(offset).copied());
        let entries = rows.iter().skip(offset).take(limit).map(|e| (*e).clone()).collect();

        Ok(EntryPage {
            entries,
            total: rows.len() as u64,
            carried,
        })
    }

    async fn party_census(
        &self,
        account_code: &str,
        party: Party,
        as_of: Option<NaiveDate>,
    ) -> Result<PartyCensus, LedgerError> {
        let state = self.state()?;
        let range = DateRange::as_of(as_of);
        let (on_account, elsewhere): (Vec<&LedgerEntry>, Vec<&LedgerEntry>) = state
            .entries
            .iter()
            .filter(|e| e.party == Some(party))
            .partition(|e| e.account_code == account_code);
        let count = |pred: &dyn Fn(&LedgerEntry) -> bool| {
            on_account.iter().filter(|&&e| pred(e)).count() as u64
        };

        Ok(PartyCensus {
            live_in_range: count(&|e| e.is_effective() && range.contains(e.transaction_date)),
            live_total: count(&LedgerEntry::is_effective),
            reversed: count(&|e| !e.is_live()),
            not_completed: count(&|e| e.status != EntryStatus::Completed),
            other_accounts: elsewhere.len() as u64,
        })
    }

    async fn unbalanced_groups(&self) -> Result<Vec<GroupImbalance>, LedgerError> {
        let state = self.state()?;
        let mut groups: BTreeMap<TransactionId, EntryTotals> = BTreeMap::new();
        for entry in state.entries.iter().filter(|e| e.is_effective()) {
            groups
                .entry(entry.transaction_id)
                .or_default()
                .add(entry.debit, entry.credit);
        }
        Ok(groups
            .into_iter()
            .filter(|(_, t)| !within_tolerance(t.debit, t.credit))
            .map(|(transaction_id, t)| GroupImbalance {
                transaction_id,
                debit: t.debit,
                credit: t.credit,
            })
            .collect())
    }

    async fn malformed_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self
            .state()?
            .entries
            .iter()
            .filter(|e| e.is_live() && !e.has_valid_shape())
            .cloned()
            .collect())
    }
}

impl PartyBalanceCache for InMemoryLedgerStore {
    async fn cached_balances(&self, kind: PartyKind) -> Result<Vec<CachedBalance>, LedgerError> {
        Ok(self
            .state()?
            .parties(kind)
            .iter()
            .map(|(&party_id, &balance)| CachedBalance { party_id, balance })
            .collect())
    }

    async fn cached_balance(&self, party: Party) -> Result<Option<Decimal>, LedgerError> {
        Ok(self.state()?.parties(party.kind()).get(&party.id()).copied())
    }

    async fn overwrite_balance(&self, party: Party, balance: Decimal) -> Result<(), LedgerError> {
        let mut state = self.state()?;
        let slot = state
            .parties_mut(party.kind())
            .get_mut(&party.id())
            .ok_or(LedgerError::PartyNotFound(party))?;
        *slot = balance;
        Ok(())
    }
}
