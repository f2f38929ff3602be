//! Property-based tests for the ledger engines over the in-memory store.
//!
//! - Balance invariant: after every posting in a random sequence, total
//!   debits equal total credits and the accounting equation holds
//! - Cached account balances match derived balances
//! - Party balances sum to their subsidiary account balance
//! - Reversal is idempotent
//! - A delta adjustment from A to B lands on the same balances as posting B
//!   directly, and the original A entries stay live

use std::sync::Arc;

use chrono::NaiveDate;
use ledgerline_shared::types::{CustomerId, SupplierId, UserId, within_tolerance};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::memory::InMemoryLedgerStore;
use super::service::LedgerService;
use super::store::LedgerStore;
use super::types::{
    AccountPair, DateRange, PostingKind, PostingLine, PostingMetadata, ReferenceKey, ReferenceType,
};
use crate::chart::{AccountMap, AccountType, Party, PartyKind};

/// A business event template.
#[derive(Debug, Clone, Copy)]
enum Event {
    Sale,
    Receipt,
    Purchase,
    Payment,
    Expense,
}

fn event_strategy() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Sale),
        Just(Event::Receipt),
        Just(Event::Purchase),
        Just(Event::Payment),
        Just(Event::Expense),
    ]
}

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
}

struct Fixture {
    ledger: LedgerService<InMemoryLedgerStore>,
    customers: [Party; 2],
    suppliers: [Party; 2],
}

impl Fixture {
    fn new() -> Self {
        Self {
            ledger: LedgerService::new(
                Arc::new(InMemoryLedgerStore::standard()),
                AccountMap::standard(),
                "USD",
            ),
            customers: [
                Party::Customer(CustomerId::new()),
                Party::Customer(CustomerId::new()),
            ],
            suppliers: [
                Party::Supplier(SupplierId::new()),
                Party::Supplier(SupplierId::new()),
            ],
        }
    }

    async fn post(&self, index: usize, event: Event, amount: Decimal) {
        let customer = self.customers[index % 2];
        let supplier = self.suppliers[index % 2];
        let (reference_type, debit, credit, party) = match event {
            Event::Sale => (ReferenceType::Sale, "1100", "4000", Some(customer)),
            Event::Receipt => (ReferenceType::CashReceipt, "1000", "1100", Some(customer)),
            Event::Purchase => (ReferenceType::PurchaseInvoice, "1200", "2000", Some(supplier)),
            Event::Payment => (ReferenceType::BankPayment, "2000", "1010", Some(supplier)),
            Event::Expense => (ReferenceType::Expense, "6300", "1000", None),
        };

        let mut metadata = PostingMetadata::new(
            ReferenceKey::new(reference_type, format!("E{index}")),
            date(),
            UserId::new(),
        );
        metadata.party = party;

        self.ledger
            .post(
                vec![PostingLine::debit(debit, amount), PostingLine::credit(credit, amount)],
                metadata,
            )
            .await
            .unwrap();
    }

    /// Credit sale of `principal` to the first customer, then a receipt of
    /// `received` against it.
    async fn sale_with_receipt(&self, principal: Decimal, received: Decimal) -> ReferenceKey {
        let customer = self.customers[0];
        self.ledger
            .post(
                vec![PostingLine::debit("1100", principal), PostingLine::credit("4000", principal)],
                PostingMetadata::new(
                    ReferenceKey::new(ReferenceType::Sale, "S1"),
                    date(),
                    UserId::new(),
                )
                .with_party(customer),
            )
            .await
            .unwrap();

        let receipt = ReferenceKey::new(ReferenceType::CashReceipt, "R1");
        self.ledger
            .post(
                vec![PostingLine::debit("1000", received), PostingLine::credit("1100", received)],
                PostingMetadata::new(receipt.clone(), date(), UserId::new()).with_party(customer),
            )
            .await
            .unwrap();
        receipt
    }

    /// Assets - (Liabilities + Equity + Revenue - Expenses).
    async fn equation_gap(&self) -> Decimal {
        let mut gap = Decimal::ZERO;
        for account in self.ledger.store().list_accounts().await.unwrap() {
            let balance = self.ledger.account_balance(&account.code, None).await.unwrap();
            match account.account_type {
                AccountType::Asset | AccountType::Expense => gap += balance,
                AccountType::Liability | AccountType::Equity | AccountType::Revenue => {
                    gap -= balance;
                }
            }
        }
        gap
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Every prefix of a random posting sequence keeps the ledger balanced.
    #[test]
    fn prop_ledger_stays_balanced(
        events in prop::collection::vec((event_strategy(), positive_amount()), 1..15),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let fixture = Fixture::new();
            for (index, (event, amount)) in events.iter().enumerate() {
                fixture.post(index, *event, *amount).await;

                let totals = fixture
                    .ledger
                    .store()
                    .totals_by_account(DateRange::all())
                    .await
                    .unwrap();
                let debit: Decimal = totals.values().map(|t| t.debit).sum();
                let credit: Decimal = totals.values().map(|t| t.credit).sum();
                assert_eq!(debit, credit, "trial balance broke after event {index}");
                assert_eq!(fixture.equation_gap().await, Decimal::ZERO);
            }
        });
    }

    /// The cached account balance always equals the derived balance.
    #[test]
    fn prop_cache_matches_derived_balance(
        events in prop::collection::vec((event_strategy(), positive_amount()), 1..15),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let fixture = Fixture::new();
            for (index, (event, amount)) in events.iter().enumerate() {
                fixture.post(index, *event, *amount).await;
            }
            for code in ["1000", "1010", "1100", "1200", "2000", "4000", "6300"] {
                let derived = fixture.ledger.account_balance(code, None).await.unwrap();
                let cached = fixture
                    .ledger
                    .store()
                    .cached_account_balance(code)
                    .unwrap()
                    .unwrap_or_default();
                assert_eq!(cached, derived, "cache drifted on {code}");
            }
        });
    }

    /// Party balances on a subsidiary account sum to the account balance.
    #[test]
    fn prop_party_balances_sum_to_subsidiary(
        events in prop::collection::vec((event_strategy(), positive_amount()), 1..15),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let fixture = Fixture::new();
            for (index, (event, amount)) in events.iter().enumerate() {
                fixture.post(index, *event, *amount).await;
            }

            let ids: Vec<_> = fixture.customers.iter().map(Party::id).collect();
            let customers = fixture
                .ledger
                .bulk_party_balances(PartyKind::Customer, &ids, None)
                .await
                .unwrap();
            let receivable = fixture.ledger.account_balance("1100", None).await.unwrap();
            assert_eq!(customers.values().copied().sum::<Decimal>(), receivable);

            let ids: Vec<_> = fixture.suppliers.iter().map(Party::id).collect();
            let suppliers = fixture
                .ledger
                .bulk_party_balances(PartyKind::Supplier, &ids, None)
                .await
                .unwrap();
            let payable = fixture.ledger.account_balance("2000", None).await.unwrap();
            assert_eq!(suppliers.values().copied().sum::<Decimal>(), payable);

            for party in fixture.customers {
                let single = fixture.ledger.party_balance(party, None).await.unwrap();
                assert_eq!(customers[&party.id()], single);
            }
        });
    }

    /// Correcting a receipt with a delta matches posting the corrected amount.
    #[test]
    fn prop_delta_matches_direct_post(
        principal in positive_amount(),
        original in positive_amount(),
        corrected in positive_amount(),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let adjusted = Fixture::new();
            let receipt = adjusted.sale_with_receipt(principal, original).await;
            adjusted
                .ledger
                .post_delta(
                    original,
                    corrected,
                    &AccountPair::new("1000", "1100"),
                    PostingMetadata::new(receipt.clone(), date(), UserId::new())
                        .with_party(adjusted.customers[0]),
                )
                .await
                .unwrap();

            let direct = Fixture {
                customers: adjusted.customers,
                ..Fixture::new()
            };
            direct.sale_with_receipt(principal, corrected).await;

            for code in ["1000", "1100", "4000"] {
                let left = adjusted.ledger.account_balance(code, None).await.unwrap();
                let right = direct.ledger.account_balance(code, None).await.unwrap();
                assert!(within_tolerance(left, right), "{code}: {left} vs {right}");
            }
            let customer = adjusted.customers[0];
            let left = adjusted.ledger.party_balance(customer, None).await.unwrap();
            let right = direct.ledger.party_balance(customer, None).await.unwrap();
            assert!(within_tolerance(left, right));

            let history = adjusted.ledger.entries_for_reference(&receipt, true).await.unwrap();
            let originals: Vec<_> = history
                .iter()
                .filter(|e| e.posting_kind == PostingKind::Original)
                .collect();
            assert_eq!(originals.len(), 2);
            assert!(originals.iter().all(|e| e.is_live()));
            assert!(originals.iter().all(|e| e.debit == original || e.credit == original));
            assert!(history.iter().all(|e| e.is_live()));
        });
    }

    /// Reversing a reference twice changes nothing the second time.
    #[test]
    fn prop_reversal_is_idempotent(
        events in prop::collection::vec((event_strategy(), positive_amount()), 1..10),
        pick in any::<prop::sample::Index>(),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let fixture = Fixture::new();
            for (index, (event, amount)) in events.iter().enumerate() {
                fixture.post(index, *event, *amount).await;
            }

            let index = pick.index(events.len());
            let entries = fixture.ledger.store().all_entries().unwrap();
            let reference = entries
                .iter()
                .find(|e| e.reference.reference_id == format!("E{index}"))
                .map(|e| e.reference.clone())
                .unwrap();

            let first = fixture.ledger.reverse_by_reference(&reference).await.unwrap();
            let cash_after_first = fixture.ledger.account_balance("1000", None).await.unwrap();
            let second = fixture.ledger.reverse_by_reference(&reference).await.unwrap();

            assert_eq!(first, 2);
            assert_eq!(second, 0);
            assert_eq!(
                fixture.ledger.account_balance("1000", None).await.unwrap(),
                cash_after_first
            );
            assert!(!fixture.ledger.is_posted(&reference).await.unwrap());
            assert_eq!(fixture.equation_gap().await, Decimal::ZERO);
        });
    }
}
