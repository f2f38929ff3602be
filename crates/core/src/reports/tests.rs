//! Report tests: pure builders plus generation over the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ledgerline_shared::types::{CustomerId, LedgerEntryId, TransactionId, UserId};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ReportError;
use super::generator::StatementGenerator;
use super::service::{ReportService, fiscal_year_start};
use super::types::{EquityRollForward, Provenance};
use crate::chart::{Account, AccountMap, AccountType, NormalBalance, Party, standard_chart};
use crate::ledger::{
    EntryStatus, EntryTotals, HistoricalSales, HistoricalSalesSource, InMemoryLedgerStore,
    LedgerEntry, LedgerError, LedgerService, PostingKind, PostingLine, PostingMetadata,
    ReferenceKey, ReferenceType,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn totals(rows: &[(&str, Decimal, Decimal)]) -> HashMap<String, EntryTotals> {
    rows.iter()
        .map(|(code, debit, credit)| {
            (
                (*code).to_string(),
                EntryTotals {
                    debit: *debit,
                    credit: *credit,
                },
            )
        })
        .collect()
}

// ========================================================================
// Pure builders
// ========================================================================

#[rstest]
#[case(date(2026, 5, 10), 1, date(2026, 1, 1))]
#[case(date(2026, 5, 10), 7, date(2025, 7, 1))]
#[case(date(2026, 7, 1), 7, date(2026, 7, 1))]
#[case(date(2026, 12, 31), 12, date(2026, 12, 1))]
fn test_fiscal_year_start(#[case] as_of: NaiveDate, #[case] month: u32, #[case] expected: NaiveDate) {
    assert_eq!(fiscal_year_start(as_of, month).unwrap(), expected);
}

#[test]
fn test_fiscal_year_start_rejects_bad_month() {
    assert!(matches!(
        fiscal_year_start(date(2026, 5, 10), 13),
        Err(ReportError::InvalidFiscalYearStart(13))
    ));
}

#[test]
fn test_profit_and_loss_separates_cogs_from_expenses() {
    let chart = standard_chart();
    let t = totals(&[
        ("4000", dec!(0), dec!(1000)),
        ("4100", dec!(50), dec!(0)),
        ("5000", dec!(400), dec!(0)),
        ("6100", dec!(200), dec!(0)),
        ("1000", dec!(750), dec!(0)),
    ]);

    let pnl = ReportService::profit_and_loss(
        &chart,
        &t,
        &AccountMap::standard(),
        Some(date(2026, 1, 1)),
        date(2026, 1, 31),
        "USD",
    );

    assert_eq!(pnl.revenue.total, dec!(950));
    assert_eq!(pnl.cost_of_goods_sold.total, dec!(400));
    assert_eq!(pnl.gross_profit, dec!(550));
    assert_eq!(pnl.expenses.total, dec!(200));
    assert_eq!(pnl.net_income, dec!(350));
    assert_eq!(pnl.provenance, Provenance::Ledger);
    assert_eq!(pnl.cost_of_goods_sold.accounts.len(), 1);
    // Every active expense account shows, even without activity.
    assert_eq!(pnl.expenses.accounts.len(), 4);
}

#[test]
fn test_profit_and_loss_hides_inactive_accounts_without_balance() {
    let mut chart = standard_chart();
    for account in &mut chart {
        if account.code == "6200" {
            account.is_active = false;
        }
    }

    let pnl = ReportService::profit_and_loss(
        &chart,
        &HashMap::new(),
        &AccountMap::standard(),
        None,
        date(2026, 1, 31),
        "USD",
    );

    assert!(pnl.expenses.accounts.iter().all(|a| a.code != "6200"));
}

#[test]
fn test_period_profit_and_loss_ignores_opening_balances() {
    let chart = vec![
        Account::new("4000", "Sales Revenue", AccountType::Revenue).with_opening_balance(dec!(300)),
        Account::new("5000", "Cost of Goods Sold", AccountType::Expense),
    ];
    let t = totals(&[("4000", dec!(0), dec!(100))]);
    let roles = AccountMap::standard();

    let period = ReportService::profit_and_loss(&chart, &t, &roles, Some(date(2026, 1, 1)), date(2026, 1, 31), "USD");
    let lifetime = ReportService::profit_and_loss(&chart, &t, &roles, None, date(2026, 1, 31), "USD");

    assert_eq!(period.net_income, dec!(100));
    assert_eq!(lifetime.net_income, dec!(400));
}

#[test]
fn test_balance_sheet_rolls_retained_earnings_forward() {
    let chart = standard_chart();
    let t = totals(&[
        ("1000", dec!(1500), dec!(0)),
        ("2000", dec!(0), dec!(200)),
        ("3000", dec!(0), dec!(1000)),
        ("3200", dec!(0), dec!(100)),
    ]);

    let sheet = ReportService::balance_sheet(
        &chart,
        &t,
        &AccountMap::standard(),
        date(2026, 6, 30),
        EquityRollForward {
            prior_net_income: dec!(50),
            current_net_income: dec!(150),
        },
        "USD",
    );

    assert_eq!(sheet.retained_earnings, dec!(150));
    assert_eq!(sheet.current_year_net_income, dec!(150));
    assert_eq!(sheet.total_assets, dec!(1500));
    assert_eq!(sheet.total_liabilities, dec!(200));
    assert_eq!(sheet.total_equity, dec!(1300));
    assert!(sheet.is_balanced);
    assert_eq!(sheet.difference, Decimal::ZERO);
    assert!(sheet.equity.accounts.iter().all(|a| a.code != "3200"));
}

#[test]
fn test_balance_sheet_flags_gap() {
    let chart = standard_chart();
    let t = totals(&[("1000", dec!(100), dec!(0)), ("2000", dec!(0), dec!(60))]);

    let sheet = ReportService::balance_sheet(
        &chart,
        &t,
        &AccountMap::standard(),
        date(2026, 6, 30),
        EquityRollForward::default(),
        "USD",
    );

    assert!(!sheet.is_balanced);
    assert_eq!(sheet.difference, dec!(40));
}

#[test]
fn test_balance_sheet_absorbs_sub_cent_noise() {
    let chart = standard_chart();
    let t = totals(&[("1000", dec!(100.004), dec!(0)), ("2000", dec!(0), dec!(100))]);

    let sheet = ReportService::balance_sheet(
        &chart,
        &t,
        &AccountMap::standard(),
        date(2026, 6, 30),
        EquityRollForward::default(),
        "USD",
    );

    assert!(sheet.is_balanced);
}

#[test]
fn test_contra_revenue_reduces_revenue_section() {
    let mut chart = standard_chart();
    chart.push(
        Account::new("4200", "Sales Discounts", AccountType::Revenue)
            .with_normal_balance(NormalBalance::Debit),
    );
    let t = totals(&[("4000", dec!(0), dec!(1000)), ("4200", dec!(30), dec!(0))]);

    let pnl = ReportService::profit_and_loss(
        &chart,
        &t,
        &AccountMap::standard(),
        Some(date(2026, 1, 1)),
        date(2026, 1, 31),
        "USD",
    );

    let discounts = pnl.revenue.accounts.iter().find(|a| a.code == "4200").unwrap();
    assert_eq!(discounts.balance, dec!(30));
    assert_eq!(pnl.revenue.total, dec!(970));
    assert_eq!(pnl.net_income, dec!(970));
}

#[test]
fn test_header_accounts_show_only_with_a_balance() {
    let chart = standard_chart();
    let t = totals(&[("1000", dec!(100), dec!(0)), ("3000", dec!(0), dec!(100))]);
    let sheet = ReportService::balance_sheet(
        &chart,
        &t,
        &AccountMap::standard(),
        date(2026, 6, 30),
        EquityRollForward::default(),
        "USD",
    );
    assert!(sheet.assets.accounts.iter().all(|a| a.code != "1"));
    assert!(sheet.assets.accounts.iter().any(|a| a.code == "1010"));

    let mut chart = standard_chart();
    chart[0] = chart[0].clone().with_opening_balance(dec!(25));
    let sheet = ReportService::balance_sheet(
        &chart,
        &t,
        &AccountMap::standard(),
        date(2026, 6, 30),
        EquityRollForward::default(),
        "USD",
    );
    assert!(sheet.assets.accounts.iter().any(|a| a.code == "1"));
}

#[test]
fn test_trial_balance_lists_only_accounts_with_activity() {
    let chart = standard_chart();
    let t = totals(&[("1100", dec!(500), dec!(0)), ("4000", dec!(0), dec!(500))]);

    let trial = ReportService::trial_balance(&chart, &t, date(2026, 6, 30), "USD");

    assert_eq!(trial.accounts.len(), 2);
    assert_eq!(trial.total_debit, dec!(500));
    assert_eq!(trial.total_credit, dec!(500));
    assert!(trial.is_balanced);
}

// ========================================================================
// Generation over the ledger
// ========================================================================

struct StubHistory(HistoricalSales);

impl HistoricalSalesSource for StubHistory {
    async fn sales_totals(
        &self,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<HistoricalSales, LedgerError> {
        Ok(self.0)
    }
}

fn fixture(fiscal_month: u32) -> (Arc<InMemoryLedgerStore>, LedgerService<InMemoryLedgerStore>, StatementGenerator<InMemoryLedgerStore>) {
    let store = Arc::new(InMemoryLedgerStore::standard());
    let ledger = LedgerService::new(Arc::clone(&store), AccountMap::standard(), "USD");
    let generator = StatementGenerator::new(ledger.clone(), fiscal_month).unwrap();
    (store, ledger, generator)
}

async fn post(
    ledger: &LedgerService<InMemoryLedgerStore>,
    reference: &str,
    on: NaiveDate,
    debit: &str,
    credit: &str,
    amount: Decimal,
) {
    ledger
        .post(
            vec![PostingLine::debit(debit, amount), PostingLine::credit(credit, amount)],
            PostingMetadata::new(
                ReferenceKey::new(ReferenceType::Adjustment, reference),
                on,
                UserId::new(),
            ),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_generator_rejects_bad_fiscal_month() {
    let ledger = LedgerService::new(
        Arc::new(InMemoryLedgerStore::standard()),
        AccountMap::standard(),
        "USD",
    );
    assert!(matches!(
        StatementGenerator::new(ledger, 0),
        Err(ReportError::InvalidFiscalYearStart(0))
    ));
}

#[tokio::test]
async fn test_profit_and_loss_rejects_inverted_range() {
    let (_, _, generator) = fixture(1);
    let result = generator
        .profit_and_loss(Some(date(2026, 2, 1)), date(2026, 1, 1))
        .await;
    assert!(matches!(result, Err(ReportError::InvalidDateRange { .. })));
}

#[tokio::test]
async fn test_profit_and_loss_covers_only_the_period() {
    let (_, ledger, generator) = fixture(1);
    let customer = Party::Customer(CustomerId::new());
    ledger
        .post(
            vec![PostingLine::debit("1100", dec!(500)), PostingLine::credit("4000", dec!(500))],
            PostingMetadata::new(
                ReferenceKey::new(ReferenceType::Sale, "S1"),
                date(2026, 3, 5),
                UserId::new(),
            )
            .with_party(customer),
        )
        .await
        .unwrap();
    post(&ledger, "COGS-S1", date(2026, 3, 5), "5000", "1200", dec!(300)).await;
    post(&ledger, "RENT-FEB", date(2026, 2, 28), "6100", "1000", dec!(80)).await;

    let march = generator
        .profit_and_loss(Some(date(2026, 3, 1)), date(2026, 3, 31))
        .await
        .unwrap();

    assert_eq!(march.revenue.total, dec!(500));
    assert_eq!(march.gross_profit, dec!(200));
    assert_eq!(march.expenses.total, Decimal::ZERO);
    assert_eq!(march.net_income, dec!(200));
    assert_eq!(march.provenance, Provenance::Ledger);
}

#[tokio::test]
async fn test_balance_sheet_balances_across_fiscal_years() {
    let (_, ledger, generator) = fixture(7);
    post(&ledger, "CAPITAL", date(2025, 1, 2), "1000", "3000", dec!(10000)).await;
    post(&ledger, "SALE-OLD", date(2025, 3, 1), "1000", "4000", dec!(700)).await;
    post(&ledger, "RENT-OLD", date(2025, 6, 1), "6100", "1000", dec!(200)).await;
    post(&ledger, "SALE-NEW", date(2025, 8, 1), "1100", "4000", dec!(900)).await;
    post(&ledger, "BILL-NEW", date(2025, 9, 1), "6200", "2000", dec!(150)).await;

    let sheet = generator.balance_sheet(date(2025, 12, 31)).await.unwrap();

    assert_eq!(sheet.retained_earnings, dec!(500));
    assert_eq!(sheet.current_year_net_income, dec!(750));
    assert_eq!(sheet.total_assets, dec!(11400));
    assert_eq!(sheet.total_liabilities, dec!(150));
    assert_eq!(sheet.total_equity, dec!(11250));
    assert!(sheet.is_balanced);
}

#[tokio::test]
async fn test_contra_asset_nets_against_assets() {
    let mut chart = standard_chart();
    chart.push(
        Account::new("1590", "Accumulated Depreciation", AccountType::Asset)
            .with_normal_balance(NormalBalance::Credit),
    );
    chart.push(Account::new("6400", "Depreciation Expense", AccountType::Expense));
    let ledger = LedgerService::new(
        Arc::new(InMemoryLedgerStore::with_chart(chart)),
        AccountMap::standard(),
        "USD",
    );
    post(&ledger, "CAPITAL", date(2026, 1, 2), "1000", "3000", dec!(1000)).await;
    post(&ledger, "DEPR-JAN", date(2026, 1, 31), "6400", "1590", dec!(100)).await;
    let generator = StatementGenerator::new(ledger, 1).unwrap();

    let sheet = generator.balance_sheet(date(2026, 2, 28)).await.unwrap();

    let depreciation = sheet.assets.accounts.iter().find(|a| a.code == "1590").unwrap();
    assert_eq!(depreciation.balance, dec!(100));
    assert_eq!(sheet.total_assets, dec!(900));
    assert_eq!(sheet.current_year_net_income, dec!(-100));
    assert_eq!(sheet.liabilities_and_equity, dec!(900));
    assert!(sheet.is_balanced);
    assert_eq!(sheet.difference, Decimal::ZERO);
}

#[tokio::test]
async fn test_balance_sheet_flags_corrupted_ledger() {
    let (store, ledger, generator) = fixture(1);
    post(&ledger, "CAPITAL", date(2026, 1, 2), "1000", "3000", dec!(1000)).await;
    store
        .insert_unchecked(LedgerEntry {
            id: LedgerEntryId::new(),
            transaction_id: TransactionId::new(),
            account_code: "1000".into(),
            debit: dec!(25),
            credit: Decimal::ZERO,
            transaction_date: date(2026, 1, 3),
            description: "imported".into(),
            reference: ReferenceKey::new(ReferenceType::Adjustment, "IMPORT-1"),
            reference_number: None,
            party: None,
            status: EntryStatus::Completed,
            posting_kind: PostingKind::Original,
            reversed_at: None,
            created_by: UserId::new(),
            currency: "USD".into(),
            created_at: Utc::now(),
        })
        .unwrap();

    let sheet = generator.balance_sheet(date(2026, 1, 31)).await.unwrap();

    assert!(!sheet.is_balanced);
    assert_eq!(sheet.difference, dec!(25));
}

#[tokio::test]
async fn test_reversed_entries_leave_statements() {
    let (_, ledger, generator) = fixture(1);
    post(&ledger, "SALE-1", date(2026, 2, 1), "1000", "4000", dec!(100)).await;
    ledger
        .reverse_by_reference(&ReferenceKey::new(ReferenceType::Adjustment, "SALE-1"))
        .await
        .unwrap();

    let pnl = generator
        .profit_and_loss(Some(date(2026, 1, 1)), date(2026, 12, 31))
        .await
        .unwrap();
    let trial = generator.trial_balance(date(2026, 12, 31)).await.unwrap();

    assert_eq!(pnl.net_income, Decimal::ZERO);
    assert!(trial.accounts.is_empty());
}

#[tokio::test]
async fn test_empty_period_falls_back_to_source_records() {
    let (_, _, generator) = fixture(1);
    let generator = generator.with_history(Arc::new(StubHistory(HistoricalSales {
        revenue: dec!(1200),
        cost_of_goods_sold: dec!(700),
    })));

    let pnl = generator
        .profit_and_loss(Some(date(2024, 1, 1)), date(2024, 12, 31))
        .await
        .unwrap();

    assert_eq!(pnl.provenance, Provenance::SourceRecords);
    assert_eq!(pnl.revenue.total, dec!(1200));
    assert_eq!(pnl.cost_of_goods_sold.total, dec!(700));
    assert_eq!(pnl.net_income, dec!(500));
}

#[tokio::test]
async fn test_period_with_postings_ignores_source_records() {
    let (_, ledger, generator) = fixture(1);
    post(&ledger, "SALE-1", date(2026, 2, 1), "1000", "4000", dec!(100)).await;
    let generator = generator.with_history(Arc::new(StubHistory(HistoricalSales {
        revenue: dec!(9999),
        cost_of_goods_sold: Decimal::ZERO,
    })));

    let pnl = generator
        .profit_and_loss(Some(date(2026, 1, 1)), date(2026, 12, 31))
        .await
        .unwrap();

    assert_eq!(pnl.provenance, Provenance::Ledger);
    assert_eq!(pnl.net_income, dec!(100));
}
