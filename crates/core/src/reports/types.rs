//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::AccountBalance;

/// Where a statement's figures came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Derived from ledger entries.
    Ledger,
    /// Read from source sales records because the ledger had no postings.
    SourceRecords,
}

/// A group of account balances with their total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSection {
    /// Sum of the account balances, contra accounts subtracted.
    pub total: Decimal,
    /// Accounts in this section.
    pub accounts: Vec<AccountBalance>,
}

impl ReportSection {
    pub(crate) fn push(&mut self, account: AccountBalance) {
        self.total += account.statement_amount();
        self.accounts.push(account);
    }
}

/// Profit and loss statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitAndLoss {
    /// First day of the period; `None` means since inception.
    pub period_start: Option<NaiveDate>,
    /// Last day of the period.
    pub period_end: NaiveDate,
    /// Currency code.
    pub currency: String,
    /// Revenue accounts (returns reduce the total).
    pub revenue: ReportSection,
    /// Cost of goods sold.
    pub cost_of_goods_sold: ReportSection,
    /// Revenue minus COGS.
    pub gross_profit: Decimal,
    /// Every other expense account.
    pub expenses: ReportSection,
    /// Gross profit minus expenses.
    pub net_income: Decimal,
    /// Source of the figures.
    pub provenance: Provenance,
}

/// Balance sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// As of date.
    pub as_of: NaiveDate,
    /// Currency code.
    pub currency: String,
    /// Asset accounts.
    pub assets: ReportSection,
    /// Liability accounts.
    pub liabilities: ReportSection,
    /// Equity accounts other than retained earnings.
    pub equity: ReportSection,
    /// Retained earnings at the start of the current fiscal year.
    pub retained_earnings: Decimal,
    /// Net income from the fiscal year start to `as_of`.
    pub current_year_net_income: Decimal,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Equity accounts plus retained earnings plus current-year net income.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity within one cent.
    pub is_balanced: bool,
    /// `total_assets - liabilities_and_equity`.
    pub difference: Decimal,
}

/// Trial balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    /// As of date.
    pub as_of: NaiveDate,
    /// Currency code.
    pub currency: String,
    /// Accounts with their debit and credit totals.
    pub accounts: Vec<AccountBalance>,
    /// Sum of debit totals.
    pub total_debit: Decimal,
    /// Sum of credit totals.
    pub total_credit: Decimal,
    /// Whether debits equal credits within one cent.
    pub is_balanced: bool,
}

/// Net income feeding the equity section of a balance sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EquityRollForward {
    /// Net income of every period before the current fiscal year.
    pub prior_net_income: Decimal,
    /// Net income of the current fiscal year to date.
    pub current_net_income: Decimal,
}
