//! Report generation service.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use ledgerline_shared::types::within_tolerance;
use rust_decimal::Decimal;
use tracing::warn;

use super::error::ReportError;
use super::types::{
    BalanceSheet, EquityRollForward, ProfitAndLoss, Provenance, ReportSection, TrialBalance,
};
use crate::chart::{Account, AccountMap, AccountRole, AccountType};
use crate::ledger::{AccountBalance, EntryTotals, HistoricalSales};

/// First day of the fiscal year containing `date`.
///
/// # Errors
///
/// Returns `InvalidFiscalYearStart` if `start_month` is not in 1..=12.
pub fn fiscal_year_start(date: NaiveDate, start_month: u32) -> Result<NaiveDate, ReportError> {
    let year = if date.month() >= start_month {
        date.year()
    } else {
        date.year() - 1
    };
    NaiveDate::from_ymd_opt(year, start_month, 1).ok_or(ReportError::InvalidFiscalYearStart(start_month))
}

/// Service for building financial statements from account totals.
pub struct ReportService;

impl ReportService {
    /// Builds a profit and loss statement.
    ///
    /// `totals` must cover the period. Opening balances of revenue and expense
    /// accounts only count when the period has no start date.
    #[must_use]
    pub fn profit_and_loss(
        accounts: &[Account],
        totals: &HashMap<String, EntryTotals>,
        roles: &AccountMap,
        period_start: Option<NaiveDate>,
        period_end: NaiveDate,
        currency: &str,
    ) -> ProfitAndLoss {
        let cogs_code = roles.code(AccountRole::CostOfGoodsSold);
        let mut revenue = ReportSection::default();
        let mut cogs = ReportSection::default();
        let mut expenses = ReportSection::default();

        for account in accounts {
            if account.account_type.is_balance_sheet() {
                continue;
            }
            let balance = Self::balance_of(account, totals, period_start.is_none());
            if !Self::is_reportable(account, &balance) {
                continue;
            }
            match account.account_type {
                AccountType::Revenue => revenue.push(balance),
                AccountType::Expense if account.code == cogs_code => cogs.push(balance),
                AccountType::Expense => expenses.push(balance),
                AccountType::Asset | AccountType::Liability | AccountType::Equity => {}
            }
        }

        let gross_profit = revenue.total - cogs.total;
        let net_income = gross_profit - expenses.total;

        ProfitAndLoss {
            period_start,
            period_end,
            currency: currency.to_string(),
            revenue,
            cost_of_goods_sold: cogs,
            gross_profit,
            expenses,
            net_income,
            provenance: Provenance::Ledger,
        }
    }

    /// Builds a profit and loss statement from source sales records.
    #[must_use]
    pub fn profit_and_loss_from_sales(
        sales: HistoricalSales,
        accounts: &[Account],
        roles: &AccountMap,
        period_start: NaiveDate,
        period_end: NaiveDate,
        currency: &str,
    ) -> ProfitAndLoss {
        let line = |role: AccountRole, amount: Decimal| {
            let code = roles.code(role);
            let mut section = ReportSection::default();
            if let Some(account) = accounts.iter().find(|a| a.code == code) {
                let mut balance = AccountBalance::from_totals(account, Decimal::ZERO, Decimal::ZERO);
                balance.balance = if balance.is_contra() {
                    -amount
                } else {
                    amount
                };
                section.push(balance);
            }
            section
        };

        let revenue = line(AccountRole::SalesRevenue, sales.revenue);
        let cogs = line(AccountRole::CostOfGoodsSold, sales.cost_of_goods_sold);
        let gross_profit = revenue.total - cogs.total;

        ProfitAndLoss {
            period_start: Some(period_start),
            period_end,
            currency: currency.to_string(),
            revenue,
            cost_of_goods_sold: cogs,
            gross_profit,
            expenses: ReportSection::default(),
            net_income: gross_profit,
            provenance: Provenance::SourceRecords,
        }
    }

    /// Builds a balance sheet from cumulative totals up to `as_of`.
    ///
    /// Retained earnings = the retained earnings account + prior-year net income.
    /// A gap between assets and liabilities plus equity is logged and flagged.
    #[must_use]
    pub fn balance_sheet(
        accounts: &[Account],
        totals: &HashMap<String, EntryTotals>,
        roles: &AccountMap,
        as_of: NaiveDate,
        income: EquityRollForward,
        currency: &str,
    ) -> BalanceSheet {
        let retained_code = roles.code(AccountRole::RetainedEarnings);
        let mut assets = ReportSection::default();
        let mut liabilities = ReportSection::default();
        let mut equity = ReportSection::default();
        let mut retained_account = Decimal::ZERO;

        for account in accounts {
            if !account.account_type.is_balance_sheet() {
                continue;
            }
            let balance = Self::balance_of(account, totals, true);
            if account.code == retained_code {
                retained_account = balance.statement_amount();
                continue;
            }
            if !Self::is_reportable(account, &balance) {
                continue;
            }
            match account.account_type {
                AccountType::Asset => assets.push(balance),
                AccountType::Liability => liabilities.push(balance),
                AccountType::Equity => equity.push(balance),
                AccountType::Revenue | AccountType::Expense => {}
            }
        }

        let retained_earnings = retained_account + income.prior_net_income;
        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total + retained_earnings + income.current_net_income;
        let liabilities_and_equity = total_liabilities + total_equity;
        let difference = total_assets - liabilities_and_equity;
        let is_balanced = within_tolerance(total_assets, liabilities_and_equity);

        if !is_balanced {
            warn!(
                %as_of,
                %total_assets,
                %liabilities_and_equity,
                %difference,
                "balance sheet does not balance"
            );
        }

        BalanceSheet {
            as_of,
            currency: currency.to_string(),
            assets,
            liabilities,
            equity,
            retained_earnings,
            current_year_net_income: income.current_net_income,
            total_assets,
            total_liabilities,
            total_equity,
            liabilities_and_equity,
            is_balanced,
            difference,
        }
    }

    /// Builds a trial balance from entry totals.
    #[must_use]
    pub fn trial_balance(
        accounts: &[Account],
        totals: &HashMap<String, EntryTotals>,
        as_of: NaiveDate,
        currency: &str,
    ) -> TrialBalance {
        let lines: Vec<AccountBalance> = accounts
            .iter()
            .map(|account| Self::balance_of(account, totals, true))
            .filter(|b| b.debit_total != Decimal::ZERO || b.credit_total != Decimal::ZERO)
            .collect();

        let total_debit: Decimal = lines.iter().map(|b| b.debit_total).sum();
        let total_credit: Decimal = lines.iter().map(|b| b.credit_total).sum();

        TrialBalance {
            as_of,
            currency: currency.to_string(),
            accounts: lines,
            total_debit,
            total_credit,
            is_balanced: within_tolerance(total_debit, total_credit),
        }
    }

    fn balance_of(
        account: &Account,
        totals: &HashMap<String, EntryTotals>,
        include_opening: bool,
    ) -> AccountBalance {
        let t = totals.get(&account.code).copied().unwrap_or_default();
        let mut balance = AccountBalance::from_totals(account, t.debit, t.credit);
        if !include_opening {
            balance.balance -= balance.opening_balance;
            balance.opening_balance = Decimal::ZERO;
        }
        balance
    }

    /// Active postable accounts always show. Headers and inactive accounts
    /// only show with a balance, so an empty header adds no line.
    fn is_reportable(account: &Account, balance: &AccountBalance) -> bool {
        account.accepts_postings() || balance.balance != Decimal::ZERO
    }
}
