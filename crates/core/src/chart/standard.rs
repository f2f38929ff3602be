//! The default retail chart of accounts.

use super::account::{Account, AccountType};

/// Returns the standard retail chart used by the seeder and tests.
#[must_use]
pub fn standard_chart() -> Vec<Account> {
    vec![
        Account::new("1", "Assets", AccountType::Asset).header(),
        Account::new("1000", "Cash", AccountType::Asset).with_parent("1"),
        Account::new("1010", "Bank", AccountType::Asset).with_parent("1"),
        Account::new("1100", "Accounts Receivable", AccountType::Asset).with_parent("1"),
        Account::new("1200", "Inventory", AccountType::Asset).with_parent("1"),
        Account::new("2000", "Accounts Payable", AccountType::Liability),
        Account::new("3000", "Owner's Capital", AccountType::Equity),
        Account::new("3100", "Opening Balance Equity", AccountType::Equity),
        Account::new("3200", "Retained Earnings", AccountType::Equity),
        Account::new("4000", "Sales Revenue", AccountType::Revenue),
        Account::new("4100", "Sales Returns", AccountType::Revenue),
        Account::new("5000", "Cost of Goods Sold", AccountType::Expense),
        Account::new("6000", "Salaries Expense", AccountType::Expense),
        Account::new("6100", "Rent Expense", AccountType::Expense),
        Account::new("6200", "Utilities Expense", AccountType::Expense),
        Account::new("6300", "General Expense", AccountType::Expense),
    ]
}
