//! Balance derivation engine.
//!
//! Balances are always derived from live, completed ledger entries. The
//! cached `current_balance` columns are never read here.
//!
//! - Debit-normal accounts: balance = opening + debits - credits
//! - Credit-normal accounts: balance = opening + credits - debits
//! - Parties: same sign as their subsidiary account, opening zero (party
//!   openings are posted entries)

use std::collections::HashMap;

use chrono::NaiveDate;
use ledgerline_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::entry::LedgerEntry;
use super::error::LedgerError;
use super::service::LedgerService;
use super::store::{EntryTotals, LedgerStore, PartyCensus};
use super::types::DateRange;
use crate::chart::{Account, AccountType, NormalBalance, Party, PartyKind};

/// Account balance at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Side the balance grows on.
    pub normal_balance: NormalBalance,
    /// Opening balance from the chart.
    pub opening_balance: Decimal,
    /// Sum of effective debits.
    pub debit_total: Decimal,
    /// Sum of effective credits.
    pub credit_total: Decimal,
    /// Opening balance plus the signed totals.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Builds the balance of `account` from its entry totals.
    #[must_use]
    pub fn from_totals(account: &Account, debit_total: Decimal, credit_total: Decimal) -> Self {
        Self {
            code: account.code.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            normal_balance: account.normal_balance,
            opening_balance: account.opening_balance,
            debit_total,
            credit_total,
            balance: account.balance_from(debit_total, credit_total),
        }
    }

    /// Returns true if the account grows on the side opposite its type's
    /// default, e.g. accumulated depreciation (a credit-normal asset).
    #[must_use]
    pub fn is_contra(&self) -> bool {
        self.normal_balance != self.account_type.default_normal_balance()
    }

    /// The balance as it counts toward its account type's statement section.
    ///
    /// Contra accounts reduce their section.
    #[must_use]
    pub fn statement_amount(&self) -> Decimal {
        if self.is_contra() {
            -self.balance
        } else {
            self.balance
        }
    }
}

/// Running balance of one statement line.
///
/// - `current_balance[N] = previous_balance[N] + change[N]`
/// - `previous_balance[N] = current_balance[N-1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Position on the statement, starting at 1.
    pub line_number: u64,
    /// Balance before this line.
    pub previous_balance: Decimal,
    /// Balance after this line.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// First line after the balance brought forward.
    #[must_use]
    pub fn first(brought_forward: Decimal, change: Decimal) -> Self {
        Self {
            line_number: 1,
            previous_balance: brought_forward,
            current_balance: brought_forward + change,
        }
    }

    /// Line following `previous`.
    #[must_use]
    pub fn next(previous: &Self, change: Decimal) -> Self {
        Self {
            line_number: previous.line_number + 1,
            previous_balance: previous.current_balance,
            current_balance: previous.current_balance + change,
        }
    }

    /// Applies `changes` in order starting from `brought_forward`.
    #[must_use]
    pub fn chain(brought_forward: Decimal, changes: &[Decimal]) -> Vec<Self> {
        let mut out: Vec<Self> = Vec::with_capacity(changes.len());
        for &change in changes {
            let next = match out.last() {
                Some(previous) => Self::next(previous, change),
                None => Self::first(brought_forward, change),
            };
            out.push(next);
        }
        out
    }
}

/// One line of an account statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLine {
    /// The ledger entry.
    pub entry: LedgerEntry,
    /// Account balance after this entry.
    pub running_balance: Decimal,
}

/// A page of an account statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatement {
    /// Account code.
    pub account_code: String,
    /// Balance before the first line of this page.
    pub brought_forward: Decimal,
    /// Statement lines, oldest first.
    pub lines: PageResponse<StatementLine>,
}

/// Structured explanation of a party's ledger balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyDiagnostic {
    /// The party.
    pub party: Party,
    /// Subsidiary account examined.
    pub account_code: String,
    /// Date bound applied.
    pub as_of: Option<NaiveDate>,
    /// Derived balance.
    pub balance: Decimal,
    /// Entry counts.
    pub census: PartyCensus,
}

impl<S: LedgerStore> LedgerService<S> {
    /// Looks up one account by code.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account has the code.
    pub async fn account(&self, code: &str) -> Result<Account, LedgerError> {
        self.store()
            .find_accounts(&[code.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))
    }

    /// Balance of an account, optionally as of a date (inclusive).
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a store error.
    pub async fn account_balance(
        &self,
        code: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<Decimal, LedgerError> {
        Ok(self.account_balance_detail(code, as_of).await?.balance)
    }

    /// Balance of an account with its opening balance and totals.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a store error.
    pub async fn account_balance_detail(
        &self,
        code: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<AccountBalance, LedgerError> {
        let account = self.account(code).await?;
        let totals = self
            .store()
            .account_totals(code, DateRange::as_of(as_of))
            .await?;
        Ok(AccountBalance::from_totals(&account, totals.debit, totals.credit))
    }

    /// Balance of a customer (on AR) or supplier (on AP).
    ///
    /// Positive means the customer owes the business, or the business owes the supplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the subsidiary account is missing or the store fails.
    pub async fn party_balance(
        &self,
        party: Party,
        as_of: Option<NaiveDate>,
    ) -> Result<Decimal, LedgerError> {
        let account = self.account(self.accounts().subsidiary_for(party.kind())).await?;
        let totals = self
            .store()
            .party_totals(&account.code, party, DateRange::as_of(as_of))
            .await?;
        Ok(account.normal_balance.signed(totals.debit, totals.credit))
    }

    /// Balances of many parties of one kind in a single aggregate.
    ///
    /// Every requested id is present in the result; ids without entries map to zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the subsidiary account is missing or the store fails.
    pub async fn bulk_party_balances(
        &self,
        kind: PartyKind,
        party_ids: &[Uuid],
        as_of: Option<NaiveDate>,
    ) -> Result<HashMap<Uuid, Decimal>, LedgerError> {
        if party_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let account = self.account(self.accounts().subsidiary_for(kind)).await?;
        let totals = self
            .store()
            .party_totals_bulk(&account.code, kind, party_ids, DateRange::as_of(as_of))
            .await?;

        Ok(party_ids
            .iter()
            .map(|id| {
                let balance = totals
                    .get(id)
                    .map_or(Decimal::ZERO, |t| account.normal_balance.signed(t.debit, t.credit));
                (*id, balance)
            })
            .collect())
    }

    /// A page of an account's entries with running balances.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a store error.
    pub async fn account_ledger(
        &self,
        code: &str,
        range: DateRange,
        page: PageRequest,
    ) -> Result<AccountStatement, LedgerError> {
        let account = self.account(code).await?;

        let before_range = match range.from.and_then(DateRange::before) {
            Some(before) => self.store().account_totals(code, before).await?,
            None => EntryTotals::default(),
        };
        let entry_page = self.store().account_entries(code, range, page).await?;

        let brought_forward = account.opening_balance
            + account
                .normal_balance
                .signed(before_range.debit, before_range.credit)
            + account
                .normal_balance
                .signed(entry_page.carried.debit, entry_page.carried.credit);

        let changes: Vec<Decimal> = entry_page
            .entries
            .iter()
            .map(|e| account.normal_balance.signed(e.debit, e.credit))
            .collect();
        let running = RunningBalance::chain(brought_forward, &changes);

        let lines = entry_page
            .entries
            .into_iter()
            .zip(running)
            .map(|(entry, balance)| StatementLine {
                entry,
                running_balance: balance.current_balance,
            })
            .collect();

        Ok(AccountStatement {
            account_code: account.code,
            brought_forward,
            lines: PageResponse::new(lines, page, entry_page.total),
        })
    }

    /// Explains a party's balance with entry counts, logged as one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the subsidiary account is missing or the store fails.
    pub async fn diagnose_party(
        &self,
        party: Party,
        as_of: Option<NaiveDate>,
    ) -> Result<PartyDiagnostic, LedgerError> {
        let account_code = self.accounts().subsidiary_for(party.kind()).to_string();
        let balance = self.party_balance(party, as_of).await?;
        let census = self
            .store()
            .party_census(&account_code, party, as_of)
            .await?;

        info!(
            %party,
            account_code = %account_code,
            ?as_of,
            %balance,
            live_in_range = census.live_in_range,
            live_total = census.live_total,
            reversed = census.reversed,
            not_completed = census.not_completed,
            other_accounts = census.other_accounts,
            "party balance diagnostic"
        );

        Ok(PartyDiagnostic {
            party,
            account_code,
            as_of,
            balance,
            census,
        })
    }
}
