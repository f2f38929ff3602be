//! Account domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (cash, receivables, inventory).
    Asset,
    /// Obligations owed (payables).
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income from sales.
    Revenue,
    /// Costs incurred, including cost of goods sold.
    Expense,
}

impl AccountType {
    /// Returns the side on which accounts of this type normally carry a balance.
    ///
    /// - Asset/Expense: debit-normal
    /// - Liability/Equity/Revenue: credit-normal
    #[must_use]
    pub const fn default_normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Returns true for accounts reported on the balance sheet.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }

    /// Lowercase name used in storage and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

/// Side on which an account's balance increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Balance = debits - credits.
    Debit,
    /// Balance = credits - debits.
    Credit,
}

impl NormalBalance {
    /// Signed contribution of a debit/credit pair to a balance of this side.
    #[must_use]
    pub fn signed(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable unique code, e.g. `"1100"`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Side on which the balance grows.
    pub normal_balance: NormalBalance,
    /// False for header/summary accounts.
    pub allow_direct_posting: bool,
    /// Inactive accounts reject new postings.
    pub is_active: bool,
    /// Opening balance in the normal-balance sense.
    pub opening_balance: Decimal,
    /// Optional header account this one is grouped under.
    pub parent_code: Option<String>,
}

impl Account {
    /// Creates an active, postable account with the type's default normal balance.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            account_type,
            normal_balance: account_type.default_normal_balance(),
            allow_direct_posting: true,
            is_active: true,
            opening_balance: Decimal::ZERO,
            parent_code: None,
        }
    }

    /// Marks the account as a header that cannot be posted to directly.
    #[must_use]
    pub fn header(mut self) -> Self {
        self.allow_direct_posting = false;
        self
    }

    /// Groups the account under a header account.
    #[must_use]
    pub fn with_parent(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }

    /// Overrides the normal balance side, for contra accounts.
    #[must_use]
    pub fn with_normal_balance(mut self, normal_balance: NormalBalance) -> Self {
        self.normal_balance = normal_balance;
        self
    }

    /// Sets the opening balance.
    #[must_use]
    pub fn with_opening_balance(mut self, opening_balance: Decimal) -> Self {
        self.opening_balance = opening_balance;
        self
    }

    /// Returns true if entries may be written against this account.
    #[must_use]
    pub fn accepts_postings(&self) -> bool {
        self.is_active && self.allow_direct_posting
    }

    /// Balance from totals: opening balance plus the signed debit/credit sum.
    #[must_use]
    pub fn balance_from(&self, debit_total: Decimal, credit_total: Decimal) -> Decimal {
        self.opening_balance + self.normal_balance.signed(debit_total, credit_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(AccountType::Asset, NormalBalance::Debit)]
    #[case(AccountType::Expense, NormalBalance::Debit)]
    #[case(AccountType::Liability, NormalBalance::Credit)]
    #[case(AccountType::Equity, NormalBalance::Credit)]
    #[case(AccountType::Revenue, NormalBalance::Credit)]
    fn test_default_normal_balance(#[case] account_type: AccountType, #[case] expected: NormalBalance) {
        assert_eq!(account_type.default_normal_balance(), expected);
    }

    #[test]
    fn test_signed_contribution() {
        assert_eq!(NormalBalance::Debit.signed(dec!(100), dec!(30)), dec!(70));
        assert_eq!(NormalBalance::Credit.signed(dec!(100), dec!(30)), dec!(-70));
    }

    #[test]
    fn test_balance_includes_opening_balance() {
        let account = Account::new("1000", "Cash", AccountType::Asset).with_opening_balance(dec!(250));
        assert_eq!(account.balance_from(dec!(100), dec!(40)), dec!(310));
    }

    #[test]
    fn test_header_and_inactive_accounts_reject_postings() {
        let header = Account::new("1", "Assets", AccountType::Asset).header();
        assert!(!header.accepts_postings());

        let mut inactive = Account::new("6100", "Rent", AccountType::Expense);
        inactive.is_active = false;
        assert!(!inactive.accepts_postings());

        assert!(Account::new("1000", "Cash", AccountType::Asset).accepts_postings());
    }
}
