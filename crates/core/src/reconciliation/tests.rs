//! Reconciliation tests over the in-memory store.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ledgerline_shared::types::{CustomerId, LedgerEntryId, SupplierId, TransactionId, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::service::Reconciler;
use super::types::{ReconcileScope, ReconcileStatus};
use crate::chart::{AccountMap, Party};
use crate::ledger::{
    EntryStatus, InMemoryLedgerStore, LedgerEntry, LedgerError, LedgerService, PostingKind,
    PostingLine, PostingMetadata, ReferenceKey, ReferenceType,
};

struct Fixture {
    store: Arc<InMemoryLedgerStore>,
    ledger: LedgerService<InMemoryLedgerStore>,
    reconciler: Reconciler<InMemoryLedgerStore, InMemoryLedgerStore>,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryLedgerStore::standard());
    let ledger = LedgerService::new(Arc::clone(&store), AccountMap::standard(), "USD");
    let reconciler = Reconciler::new(ledger.clone(), Arc::clone(&store));
    Fixture {
        store,
        ledger,
        reconciler,
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

async fn sell(ledger: &LedgerService<InMemoryLedgerStore>, id: &str, customer: Party, amount: Decimal) {
    let metadata = PostingMetadata::new(ReferenceKey::new(ReferenceType::Sale, id), date(), UserId::new())
        .with_party(customer);
    ledger
        .post(
            vec![PostingLine::debit("1100", amount), PostingLine::credit("4000", amount)],
            metadata,
        )
        .await
        .unwrap();
}

async fn buy(ledger: &LedgerService<InMemoryLedgerStore>, id: &str, supplier: Party, amount: Decimal) {
    let metadata = PostingMetadata::new(
        ReferenceKey::new(ReferenceType::PurchaseInvoice, id),
        date(),
        UserId::new(),
    )
    .with_party(supplier);
    ledger
        .post(
            vec![PostingLine::debit("1200", amount), PostingLine::credit("2000", amount)],
            metadata,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reconcile_reports_and_corrects_drift() {
    let f = fixture();
    let honest = Party::Customer(CustomerId::new());
    let drifted = Party::Customer(CustomerId::new());
    let supplier = Party::Supplier(SupplierId::new());

    sell(&f.ledger, "S1", honest, dec!(200)).await;
    sell(&f.ledger, "S2", drifted, dec!(500)).await;
    buy(&f.ledger, "P1", supplier, dec!(90)).await;

    f.store.add_party(honest, dec!(200)).unwrap();
    f.store.add_party(drifted, dec!(350)).unwrap();
    f.store.add_party(supplier, dec!(90.004)).unwrap();

    let report = f.reconciler.reconcile(ReconcileScope::All, false).await;
    assert_eq!(report.checked, 3);
    assert_eq!(report.matched, 2);
    assert_eq!(report.discrepancies.len(), 1);
    let discrepancy = &report.discrepancies[0];
    assert_eq!(discrepancy.party_id, drifted.id());
    assert_eq!(discrepancy.cached_balance, dec!(350));
    assert_eq!(discrepancy.ledger_balance, dec!(500));
    assert_eq!(discrepancy.delta, dec!(150));
    assert!(!discrepancy.corrected);
    assert_eq!(report.corrected(), 0);

    let report = f.reconciler.reconcile(ReconcileScope::Customers, true).await;
    assert_eq!(report.corrected(), 1);
    assert!(report.errors.is_empty());

    let report = f.reconciler.reconcile(ReconcileScope::All, false).await;
    assert!(report.is_clean());
    assert_eq!(report.matched, 3);
}

#[tokio::test]
async fn test_reversed_entries_are_excluded() {
    let f = fixture();
    let customer = Party::Customer(CustomerId::new());
    sell(&f.ledger, "S1", customer, dec!(500)).await;
    f.ledger
        .reverse_by_reference(&ReferenceKey::new(ReferenceType::Sale, "S1"))
        .await
        .unwrap();
    f.store.add_party(customer, dec!(500)).unwrap();

    let report = f.reconciler.reconcile(ReconcileScope::Customers, true).await;
    assert_eq!(report.discrepancies.len(), 1);
    assert_eq!(report.discrepancies[0].ledger_balance, Decimal::ZERO);
    assert_eq!(
        f.reconciler.reconcile_party(customer, false).await.unwrap().status,
        ReconcileStatus::Matched
    );
}

#[tokio::test]
async fn test_bulk_failure_falls_back_to_isolated_per_party() {
    let f = fixture();
    let good = Party::Customer(CustomerId::new());
    let broken = Party::Customer(CustomerId::new());
    sell(&f.ledger, "S1", good, dec!(120)).await;
    f.store.add_party(good, dec!(100)).unwrap();
    f.store.add_party(broken, dec!(0)).unwrap();

    f.store.fail_bulk_queries(true).unwrap();
    f.store.fail_party(broken.id()).unwrap();

    let report = f.reconciler.reconcile(ReconcileScope::Customers, true).await;
    assert_eq!(report.checked, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].party_id, Some(broken.id()));
    assert_eq!(report.discrepancies.len(), 1);
    assert!(report.discrepancies[0].corrected);

    assert_eq!(
        f.reconciler.reconcile_party(good, false).await.unwrap().status,
        ReconcileStatus::Matched
    );
}

#[tokio::test]
async fn test_reconcile_party() {
    let f = fixture();
    let customer = Party::Customer(CustomerId::new());
    sell(&f.ledger, "S1", customer, dec!(75)).await;
    f.store.add_party(customer, dec!(10)).unwrap();

    let result = f.reconciler.reconcile_party(customer, false).await.unwrap();
    assert_eq!(result.status, ReconcileStatus::Drifted);
    assert_eq!(result.delta, dec!(65));

    let result = f.reconciler.reconcile_party(customer, true).await.unwrap();
    assert_eq!(result.status, ReconcileStatus::Corrected);
    assert_eq!(result.cached_balance, dec!(10));

    let result = f.reconciler.reconcile_party(customer, false).await.unwrap();
    assert_eq!(result.status, ReconcileStatus::Matched);

    let stranger = Party::Supplier(SupplierId::new());
    assert!(matches!(
        f.reconciler.reconcile_party(stranger, false).await,
        Err(LedgerError::PartyNotFound(p)) if p == stranger
    ));
}

fn raw_entry(transaction_id: TransactionId, debit: Decimal, credit: Decimal) -> LedgerEntry {
    LedgerEntry {
        id: LedgerEntryId::new(),
        transaction_id,
        account_code: "1000".into(),
        debit,
        credit,
        transaction_date: date(),
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
    }
}

#[tokio::test]
async fn test_validate_ledger_finds_corruption() {
    let f = fixture();
    sell(&f.ledger, "S1", Party::Customer(CustomerId::new()), dec!(10)).await;
    assert!(f.reconciler.validate_ledger().await.unwrap().is_clean());

    let broken_group = TransactionId::new();
    f.store.insert_unchecked(raw_entry(broken_group, dec!(100), dec!(0))).unwrap();
    f.store.insert_unchecked(raw_entry(broken_group, dec!(0), dec!(60))).unwrap();
    let malformed_group = TransactionId::new();
    f.store.insert_unchecked(raw_entry(malformed_group, dec!(5), dec!(5))).unwrap();

    let report = f.reconciler.validate_ledger().await.unwrap();
    assert_eq!(report.unbalanced_groups.len(), 1);
    assert_eq!(report.unbalanced_groups[0].transaction_id, broken_group);
    assert_eq!(report.unbalanced_groups[0].debit, dec!(100));
    assert_eq!(report.malformed_entries.len(), 1);
    assert_eq!(report.malformed_entries[0].transaction_id, malformed_group);
}
