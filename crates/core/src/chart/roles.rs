//! Semantic account roles and their resolution against the chart.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::account::{Account, AccountType};
use super::error::ChartError;
use super::party::PartyKind;

/// A semantic role an account plays in automated postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Cash on hand.
    Cash,
    /// Bank deposits.
    Bank,
    /// Customer subsidiary ledger.
    AccountsReceivable,
    /// Stock on hand at cost.
    Inventory,
    /// Supplier subsidiary ledger.
    AccountsPayable,
    /// Counter-account for party opening balances.
    OpeningBalanceEquity,
    /// Accumulated prior-year earnings.
    RetainedEarnings,
    /// Sales income.
    SalesRevenue,
    /// Cost of goods sold.
    CostOfGoodsSold,
}

impl AccountRole {
    /// Every role, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Cash,
        Self::Bank,
        Self::AccountsReceivable,
        Self::Inventory,
        Self::AccountsPayable,
        Self::OpeningBalanceEquity,
        Self::RetainedEarnings,
        Self::SalesRevenue,
        Self::CostOfGoodsSold,
    ];

    /// Configuration key for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::AccountsReceivable => "accounts_receivable",
            Self::Inventory => "inventory",
            Self::AccountsPayable => "accounts_payable",
            Self::OpeningBalanceEquity => "opening_balance_equity",
            Self::RetainedEarnings => "retained_earnings",
            Self::SalesRevenue => "sales_revenue",
            Self::CostOfGoodsSold => "cost_of_goods_sold",
        }
    }

    /// Code this role maps to in the standard retail chart.
    #[must_use]
    pub const fn default_code(self) -> &'static str {
        match self {
            Self::Cash => "1000",
            Self::Bank => "1010",
            Self::AccountsReceivable => "1100",
            Self::Inventory => "1200",
            Self::AccountsPayable => "2000",
            Self::OpeningBalanceEquity => "3100",
            Self::RetainedEarnings => "3200",
            Self::SalesRevenue => "4000",
            Self::CostOfGoodsSold => "5000",
        }
    }

    /// Account type an account must have to play this role.
    #[must_use]
    pub const fn required_type(self) -> AccountType {
        match self {
            Self::Cash | Self::Bank | Self::AccountsReceivable | Self::Inventory => {
                AccountType::Asset
            }
            Self::AccountsPayable => AccountType::Liability,
            Self::OpeningBalanceEquity | Self::RetainedEarnings => AccountType::Equity,
            Self::SalesRevenue => AccountType::Revenue,
            Self::CostOfGoodsSold => AccountType::Expense,
        }
    }
}

impl std::str::FromStr for AccountRole {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ChartError::UnknownRole(s.to_string()))
    }
}

/// Role to account code mapping, validated against a chart.
///
/// Built once at startup and handed to the engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMap {
    codes: HashMap<AccountRole, String>,
}

impl AccountMap {
    /// Resolves every role against `chart`, applying `overrides` (role name to code).
    ///
    /// # Errors
    ///
    /// Returns an error if an override names an unknown role, or a role maps to a
    /// code missing from the chart or to an account of the wrong type.
    pub fn resolve(
        chart: &[Account],
        overrides: &HashMap<String, String>,
    ) -> Result<Self, ChartError> {
        let mut codes: HashMap<AccountRole, String> = AccountRole::ALL
            .into_iter()
            .map(|role| (role, role.default_code().to_string()))
            .collect();

        for (name, code) in overrides {
            let role: AccountRole = name.parse()?;
            codes.insert(role, code.clone());
        }

        for role in AccountRole::ALL {
            let code = &codes[&role];
            let account = chart
                .iter()
                .find(|account| &account.code == code)
                .ok_or_else(|| ChartError::MissingAccount {
                    role: role.as_str(),
                    code: code.clone(),
                })?;

            if account.account_type != role.required_type() {
                return Err(ChartError::WrongAccountType {
                    role: role.as_str(),
                    code: code.clone(),
                    expected: role.required_type().as_str(),
                    actual: account.account_type.as_str(),
                });
            }
        }

        Ok(Self { codes })
    }

    /// The standard chart's role map, without validation.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            codes: AccountRole::ALL
                .into_iter()
                .map(|role| (role, role.default_code().to_string()))
                .collect(),
        }
    }

    /// Code of the account playing `role`.
    #[must_use]
    pub fn code(&self, role: AccountRole) -> &str {
        self.codes
            .get(&role)
            .map_or_else(|| role.default_code(), String::as_str)
    }

    /// Subsidiary ledger account for a party kind (AR for customers, AP for suppliers).
    #[must_use]
    pub fn subsidiary_for(&self, kind: PartyKind) -> &str {
        match kind {
            PartyKind::Customer => self.code(AccountRole::AccountsReceivable),
            PartyKind::Supplier => self.code(AccountRole::AccountsPayable),
        }
    }
}

impl Default for AccountMap {
    fn default() -> Self {
        Self::standard()
    }
}
