//! Property-based tests for statement generation.
//!
//! - Accounting equation: after random postings spread over several fiscal
//!   years, the balance sheet balances and the trial balance agrees, contra
//!   accounts included

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use ledgerline_shared::types::UserId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::generator::StatementGenerator;
use crate::chart::{Account, AccountMap, AccountType, NormalBalance, standard_chart};
use crate::ledger::{
    InMemoryLedgerStore, LedgerService, PostingLine, PostingMetadata, ReferenceKey, ReferenceType,
};

/// Debit/credit account pairs covering every account type and both contra accounts.
const PAIRS: [(&str, &str); 11] = [
    ("1000", "3000"),
    ("1100", "4000"),
    ("1000", "1100"),
    ("1200", "2000"),
    ("5000", "1200"),
    ("6100", "1000"),
    ("2000", "1010"),
    ("4100", "1100"),
    ("6400", "1590"),
    ("4200", "1100"),
    ("1590", "1200"),
];

/// The standard chart plus a contra asset and a contra revenue account.
fn chart_with_contras() -> Vec<Account> {
    let mut chart = standard_chart();
    chart.push(
        Account::new("1590", "Accumulated Depreciation", AccountType::Asset)
            .with_normal_balance(NormalBalance::Credit),
    );
    chart.push(
        Account::new("4200", "Sales Discounts", AccountType::Revenue)
            .with_normal_balance(NormalBalance::Debit),
    );
    chart.push(Account::new("6400", "Depreciation Expense", AccountType::Expense));
    chart
}

fn posting_strategy() -> impl Strategy<Value = (usize, i64, u64)> {
    (0..PAIRS.len(), 1i64..1_000_000i64, 0u64..1_000u64)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn prop_balance_sheet_always_balances(
        postings in prop::collection::vec(posting_strategy(), 1..20),
        fiscal_month in 1u32..=12,
        as_of_offset in 0u64..1_200u64,
    ) {
        let rt = runtime();
        rt.block_on(async {
            let ledger = LedgerService::new(
                Arc::new(InMemoryLedgerStore::with_chart(chart_with_contras())),
                AccountMap::standard(),
                "USD",
            );
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

            for (index, (pair, cents, offset)) in postings.iter().enumerate() {
                let (debit, credit) = PAIRS[*pair];
                let amount = Decimal::new(*cents, 2);
                ledger
                    .post(
                        vec![PostingLine::debit(debit, amount), PostingLine::credit(credit, amount)],
                        PostingMetadata::new(
                            ReferenceKey::new(ReferenceType::Adjustment, format!("P{index}")),
                            start + Days::new(*offset),
                            UserId::new(),
                        ),
                    )
                    .await
                    .unwrap();
            }

            let generator = StatementGenerator::new(ledger, fiscal_month).unwrap();
            let as_of = start + Days::new(as_of_offset);

            let sheet = generator.balance_sheet(as_of).await.unwrap();
            assert!(sheet.is_balanced, "gap of {} as of {as_of}", sheet.difference);

            let trial = generator.trial_balance(as_of).await.unwrap();
            assert!(trial.is_balanced);
        });
    }
}
