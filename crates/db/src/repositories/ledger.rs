//! Ledger repository: the Postgres [`LedgerStore`].
//!
//! Every write runs in one database transaction:
//! 1. `pg_advisory_xact_lock` on the reference key serializes writers of one business event
//! 2. `SELECT ... FOR UPDATE` on the affected accounts, sorted by code
//! 3. insert and/or reverse entries
//! 4. refresh `chart_of_accounts.current_balance` from a fresh aggregate
//!
//! Concurrent postings to different accounts never wait on each other.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use ledgerline_core::chart::{Account, Party, PartyKind};
use ledgerline_core::ledger::{
    AccountRejection, DateRange, EntryPage, EntryTotals, FieldPatch, GroupImbalance, GroupWrite,
    LedgerEntry, LedgerError, LedgerStore, PartyCensus, ReferenceKey, ReferenceType, WriteMode,
};
use ledgerline_shared::types::{
    CustomerId, LedgerEntryId, PageRequest, SupplierId, TransactionId, UserId,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend,
    EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    Statement, TransactionTrait,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::account::account_from_model;
use crate::entities::{
    chart_of_accounts, ledger_entries,
    sea_orm_active_enums::{EntryStatus, PostingKind},
};
use crate::error::db_error;

/// Postgres-backed ledger store.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ============================================================================
// Row mapping
// ============================================================================

#[derive(Debug, FromQueryResult)]
struct SumRow {
    debit: Option<Decimal>,
    credit: Option<Decimal>,
}

impl From<SumRow> for EntryTotals {
    fn from(row: SumRow) -> Self {
        Self {
            debit: row.debit.unwrap_or_default(),
            credit: row.credit.unwrap_or_default(),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct AccountSumRow {
    account_code: String,
    debit: Option<Decimal>,
    credit: Option<Decimal>,
}

#[derive(Debug, FromQueryResult)]
struct PartySumRow {
    party_id: Uuid,
    debit: Option<Decimal>,
    credit: Option<Decimal>,
}

#[derive(Debug, FromQueryResult)]
struct CensusRow {
    live_in_range: i64,
    live_total: i64,
    reversed: i64,
    not_completed: i64,
    other_accounts: i64,
}

#[derive(Debug, FromQueryResult)]
struct GroupRow {
    transaction_id: Uuid,
    debit: Decimal,
    credit: Decimal,
}

fn entry_from_model(model: ledger_entries::Model) -> Result<LedgerEntry, LedgerError> {
    let reference_type: ReferenceType = model.reference_type.parse()?;
    Ok(LedgerEntry {
        id: LedgerEntryId::from_uuid(model.id),
        transaction_id: TransactionId::from_uuid(model.transaction_id),
        account_code: model.account_code,
        debit: model.debit,
        credit: model.credit,
        transaction_date: model.transaction_date,
        description: model.description,
        reference: ReferenceKey::new(reference_type, model.reference_id),
        reference_number: model.reference_number,
        party: Party::from_columns(model.customer_id, model.supplier_id),
        status: model.status.into(),
        posting_kind: model.posting_kind.into(),
        reversed_at: model.reversed_at.map(|at| at.with_timezone(&Utc)),
        created_by: UserId::from_uuid(model.created_by),
        currency: model.currency,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

fn entries_from_models(models: Vec<ledger_entries::Model>) -> Result<Vec<LedgerEntry>, LedgerError> {
    models.into_iter().map(entry_from_model).collect()
}

fn entry_to_active(entry: LedgerEntry) -> ledger_entries::ActiveModel {
    let customer_id = entry.party.and_then(|p| p.customer_id()).map(CustomerId::into_inner);
    let supplier_id = entry.party.and_then(|p| p.supplier_id()).map(SupplierId::into_inner);

    ledger_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        transaction_id: Set(entry.transaction_id.into_inner()),
        account_code: Set(entry.account_code),
        debit: Set(entry.debit),
        credit: Set(entry.credit),
        transaction_date: Set(entry.transaction_date),
        description: Set(entry.description),
        reference_type: Set(entry.reference.reference_type.as_str().to_string()),
        reference_id: Set(entry.reference.reference_id),
        reference_number: Set(entry.reference_number),
        customer_id: Set(customer_id),
        supplier_id: Set(supplier_id),
        status: Set(entry.status.into()),
        posting_kind: Set(entry.posting_kind.into()),
        reversed_at: Set(entry.reversed_at.map(Into::into)),
        created_by: Set(entry.created_by.into_inner()),
        currency: Set(entry.currency),
        created_at: Set(entry.created_at.into()),
    }
}

// ============================================================================
// Filters
// ============================================================================

fn live() -> Condition {
    Condition::all().add(ledger_entries::Column::ReversedAt.is_null())
}

fn effective() -> Condition {
    live().add(ledger_entries::Column::Status.eq(EntryStatus::Completed))
}

fn within(range: DateRange) -> Condition {
    let mut condition = Condition::all();
    if let Some(from) = range.from {
        condition = condition.add(ledger_entries::Column::TransactionDate.gte(from));
    }
    if let Some(to) = range.to {
        condition = condition.add(ledger_entries::Column::TransactionDate.lte(to));
    }
    condition
}

fn for_reference(reference: &ReferenceKey) -> Condition {
    Condition::all()
        .add(ledger_entries::Column::ReferenceType.eq(reference.reference_type.as_str()))
        .add(ledger_entries::Column::ReferenceId.eq(reference.reference_id.as_str()))
}

const fn party_column(kind: PartyKind) -> ledger_entries::Column {
    match kind {
        PartyKind::Customer => ledger_entries::Column::CustomerId,
        PartyKind::Supplier => ledger_entries::Column::SupplierId,
    }
}

fn for_party(party: Party) -> Condition {
    Condition::all().add(party_column(party.kind()).eq(party.id()))
}

/// Entries ordered the way statements read them.
fn in_statement_order(
    select: sea_orm::Select<ledger_entries::Entity>,
) -> sea_orm::Select<ledger_entries::Entity> {
    select
        .order_by_asc(ledger_entries::Column::TransactionDate)
        .order_by_asc(ledger_entries::Column::CreatedAt)
        .order_by_asc(ledger_entries::Column::Id)
}

// ============================================================================
// Transaction steps
// ============================================================================

async fn sum_where<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
) -> Result<EntryTotals, LedgerError> {
    let row = ledger_entries::Entity::find()
        .select_only()
        .column_as(Expr::col(ledger_entries::Column::Debit).sum(), "debit")
        .column_as(Expr::col(ledger_entries::Column::Credit).sum(), "credit")
        .filter(condition)
        .into_model::<SumRow>()
        .one(conn)
        .await
        .map_err(db_error)?;
    Ok(row.map(EntryTotals::from).unwrap_or_default())
}

/// Serializes writers of one reference until the transaction ends.
async fn lock_reference(txn: &DatabaseTransaction, reference: &ReferenceKey) -> Result<(), LedgerError> {
    txn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock(hashtext($1))",
        [reference.to_string().into()],
    ))
    .await
    .map_err(db_error)?;
    Ok(())
}

/// Row-locks the accounts in code order and returns them.
async fn lock_accounts(
    txn: &DatabaseTransaction,
    codes: &BTreeSet<String>,
) -> Result<BTreeMap<String, Account>, LedgerError> {
    let rows = chart_of_accounts::Entity::find()
        .filter(chart_of_accounts::Column::Code.is_in(codes.iter().cloned()))
        .order_by_asc(chart_of_accounts::Column::Code)
        .lock_exclusive()
        .all(txn)
        .await
        .map_err(db_error)?;
    Ok(rows
        .into_iter()
        .map(|row| (row.code.clone(), account_from_model(row)))
        .collect())
}

/// Re-checks every line's account under the row lock.
fn check_accounts(entries: &[LedgerEntry], accounts: &BTreeMap<String, Account>) -> Result<(), LedgerError> {
    for entry in entries {
        let reason = match accounts.get(&entry.account_code) {
            None => Some(AccountRejection::NotFound),
            Some(a) if !a.is_active => Some(AccountRejection::Inactive),
            Some(a) if !a.allow_direct_posting => Some(AccountRejection::NoDirectPosting),
            Some(_) => None,
        };
        if let Some(reason) = reason {
            return Err(LedgerError::InvalidAccount {
                code: entry.account_code.clone(),
                reason,
            });
        }
    }
    Ok(())
}

async fn reverse_live(
    txn: &DatabaseTransaction,
    reference: &ReferenceKey,
    at: DateTime<Utc>,
) -> Result<u64, LedgerError> {
    let at: DateTime<FixedOffset> = at.into();
    let result = ledger_entries::Entity::update_many()
        .col_expr(ledger_entries::Column::ReversedAt, Expr::value(at))
        .filter(live().add(for_reference(reference)))
        .exec(txn)
        .await
        .map_err(db_error)?;
    Ok(result.rows_affected)
}

/// Recomputes `current_balance` of the locked accounts in one aggregate.
async fn refresh_account_cache(
    txn: &DatabaseTransaction,
    accounts: &BTreeMap<String, Account>,
) -> Result<(), LedgerError> {
    let rows = ledger_entries::Entity::find()
        .select_only()
        .column(ledger_entries::Column::AccountCode)
        .column_as(Expr::col(ledger_entries::Column::Debit).sum(), "debit")
        .column_as(Expr::col(ledger_entries::Column::Credit).sum(), "credit")
        .filter(effective().add(ledger_entries::Column::AccountCode.is_in(accounts.keys().cloned())))
        .group_by(ledger_entries::Column::AccountCode)
        .into_model::<AccountSumRow>()
        .all(txn)
        .await
        .map_err(db_error)?;
    let totals: HashMap<String, EntryTotals> = rows
        .into_iter()
        .map(|row| {
            let totals = EntryTotals::from(SumRow {
                debit: row.debit,
                credit: row.credit,
            });
            (row.account_code, totals)
        })
        .collect();

    let now: DateTime<FixedOffset> = Utc::now().into();
    for (code, account) in accounts {
        let t = totals.get(code).copied().unwrap_or_default();
        let balance = account.balance_from(t.debit, t.credit);
        chart_of_accounts::Entity::update_many()
            .col_expr(chart_of_accounts::Column::CurrentBalance, Expr::value(balance))
            .col_expr(chart_of_accounts::Column::UpdatedAt, Expr::value(now))
            .filter(chart_of_accounts::Column::Code.eq(code.as_str()))
            .exec(txn)
            .await
            .map_err(db_error)?;
    }
    Ok(())
}

// ============================================================================
// LedgerStore
// ============================================================================

impl LedgerStore for LedgerRepository {
    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let rows = chart_of_accounts::Entity::find()
            .order_by_asc(chart_of_accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(account_from_model).collect())
    }

    async fn find_accounts(&self, codes: &[String]) -> Result<Vec<Account>, LedgerError> {
        let rows = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::Code.is_in(codes.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(account_from_model).collect())
    }

    #[instrument(skip_all, fields(reference = %write.reference, mode = ?write.mode))]
    async fn write_group(&self, write: GroupWrite) -> Result<u64, LedgerError> {
        let txn = self.db.begin().await.map_err(db_error)?;
        lock_reference(&txn, &write.reference).await?;

        let live_rows = ledger_entries::Entity::find()
            .filter(live().add(for_reference(&write.reference)))
            .all(&txn)
            .await
            .map_err(db_error)?;

        if write.mode == WriteMode::Original
            && live_rows.iter().any(|row| row.posting_kind == PostingKind::Original)
        {
            return Err(LedgerError::DuplicatePosting(write.reference));
        }

        let mut touched: BTreeSet<String> =
            write.entries.iter().map(|e| e.account_code.clone()).collect();
        if write.mode == WriteMode::Replace {
            touched.extend(live_rows.into_iter().map(|row| row.account_code));
        }

        let accounts = lock_accounts(&txn, &touched).await?;
        check_accounts(&write.entries, &accounts)?;

        let reversed = if write.mode == WriteMode::Replace {
            reverse_live(&txn, &write.reference, write.written_at).await?
        } else {
            0
        };

        let inserted = write.entries.len();
        ledger_entries::Entity::insert_many(write.entries.into_iter().map(entry_to_active))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        refresh_account_cache(&txn, &accounts).await?;
        txn.commit().await.map_err(db_error)?;

        debug!(inserted, reversed, accounts = accounts.len(), "group committed");
        Ok(reversed)
    }

    async fn has_live_entries(&self, reference: &ReferenceKey) -> Result<bool, LedgerError> {
        let count = ledger_entries::Entity::find()
            .filter(live().add(for_reference(reference)))
            .count(&self.db)
            .await
            .map_err(db_error)?;
        Ok(count > 0)
    }

    #[instrument(skip_all, fields(reference = %reference))]
    async fn reverse_reference(
        &self,
        reference: &ReferenceKey,
        at: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        let txn = self.db.begin().await.map_err(db_error)?;
        lock_reference(&txn, reference).await?;

        let touched: BTreeSet<String> = ledger_entries::Entity::find()
            .select_only()
            .column(ledger_entries::Column::AccountCode)
            .distinct()
            .filter(live().add(for_reference(reference)))
            .into_tuple::<String>()
            .all(&txn)
            .await
            .map_err(db_error)?
            .into_iter()
            .collect();
        if touched.is_empty() {
            return Ok(0);
        }

        let accounts = lock_accounts(&txn, &touched).await?;
        let reversed = reverse_live(&txn, reference, at).await?;
        refresh_account_cache(&txn, &accounts).await?;
        txn.commit().await.map_err(db_error)?;
        Ok(reversed)
    }

    async fn patch_live_entries(
        &self,
        reference: &ReferenceKey,
        patch: &FieldPatch,
    ) -> Result<u64, LedgerError> {
        let scope = live().add(for_reference(reference));
        let txn = self.db.begin().await.map_err(db_error)?;
        lock_reference(&txn, reference).await?;

        let count = ledger_entries::Entity::find()
            .filter(scope.clone())
            .count(&txn)
            .await
            .map_err(db_error)?;

        if patch.party.is_some() {
            let tagged: Vec<(Option<Uuid>, Option<Uuid>)> = ledger_entries::Entity::find()
                .select_only()
                .column(ledger_entries::Column::CustomerId)
                .column(ledger_entries::Column::SupplierId)
                .filter(scope.clone())
                .into_tuple()
                .all(&txn)
                .await
                .map_err(db_error)?;
            patch.check_party_kind(
                reference,
                tagged
                    .into_iter()
                    .filter_map(|(customer, supplier)| Party::from_columns(customer, supplier)),
            )?;
        }

        let mut update = ledger_entries::Entity::update_many().filter(scope.clone());
        let mut has_columns = false;
        if let Some(date) = patch.transaction_date {
            update = update.col_expr(ledger_entries::Column::TransactionDate, Expr::value(date));
            has_columns = true;
        }
        if let Some(number) = &patch.reference_number {
            update = update.col_expr(
                ledger_entries::Column::ReferenceNumber,
                Expr::value(number.clone()),
            );
            has_columns = true;
        }
        if let Some(description) = &patch.description {
            update = update.col_expr(
                ledger_entries::Column::Description,
                Expr::value(description.clone()),
            );
            has_columns = true;
        }
        if has_columns {
            update.exec(&txn).await.map_err(db_error)?;
        }

        // Only lines that already carry a party are re-tagged.
        if let Some(party) = patch.party {
            let tagged = Condition::any()
                .add(ledger_entries::Column::CustomerId.is_not_null())
                .add(ledger_entries::Column::SupplierId.is_not_null());
            ledger_entries::Entity::update_many()
                .col_expr(
                    ledger_entries::Column::CustomerId,
                    Expr::value(party.customer_id().map(CustomerId::into_inner)),
                )
                .col_expr(
                    ledger_entries::Column::SupplierId,
                    Expr::value(party.supplier_id().map(SupplierId::into_inner)),
                )
                .filter(scope.add(tagged))
                .exec(&txn)
                .await
                .map_err(db_error)?;
        }

        txn.commit().await.map_err(db_error)?;
        Ok(count)
    }

    async fn entries_for_reference(
        &self,
        reference: &ReferenceKey,
        include_reversed: bool,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut condition = for_reference(reference);
        if !include_reversed {
            condition = condition.add(ledger_entries::Column::ReversedAt.is_null());
        }
        let rows = ledger_entries::Entity::find()
            .filter(condition)
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .order_by_asc(ledger_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        entries_from_models(rows)
    }

    async fn account_totals(
        &self,
        account_code: &str,
        range: DateRange,
    ) -> Result<EntryTotals, LedgerError> {
        sum_where(
            &self.db,
            effective()
                .add(ledger_entries::Column::AccountCode.eq(account_code))
                .add(within(range)),
        )
        .await
    }

    async fn totals_by_account(
        &self,
        range: DateRange,
    ) -> Result<HashMap<String, EntryTotals>, LedgerError> {
        let rows = ledger_entries::Entity::find()
            .select_only()
            .column(ledger_entries::Column::AccountCode)
            .column_as(Expr::col(ledger_entries::Column::Debit).sum(), "debit")
            .column_as(Expr::col(ledger_entries::Column::Credit).sum(), "credit")
            .filter(effective().add(within(range)))
            .group_by(ledger_entries::Column::AccountCode)
            .into_model::<AccountSumRow>()
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let totals = EntryTotals::from(SumRow {
                    debit: row.debit,
                    credit: row.credit,
                });
                (row.account_code, totals)
            })
            .collect())
    }

    async fn party_totals(
        &self,
        account_code: &str,
        party: Party,
        range: DateRange,
    ) -> Result<EntryTotals, LedgerError> {
        sum_where(
            &self.db,
            effective()
                .add(ledger_entries::Column::AccountCode.eq(account_code))
                .add(for_party(party))
                .add(within(range)),
        )
        .await
    }

    async fn party_totals_bulk(
        &self,
        account_code: &str,
        kind: PartyKind,
        party_ids: &[Uuid],
        range: DateRange,
    ) -> Result<HashMap<Uuid, EntryTotals>, LedgerError> {
        if party_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let column = party_column(kind);
        let rows = ledger_entries::Entity::find()
            .select_only()
            .column_as(column, "party_id")
            .column_as(Expr::col(ledger_entries::Column::Debit).sum(), "debit")
            .column_as(Expr::col(ledger_entries::Column::Credit).sum(), "credit")
            .filter(
                effective()
                    .add(ledger_entries::Column::AccountCode.eq(account_code))
                    .add(column.is_in(party_ids.iter().copied()))
                    .add(within(range)),
            )
            .group_by(column)
            .into_model::<PartySumRow>()
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let totals = EntryTotals::from(SumRow {
                    debit: row.debit,
                    credit: row.credit,
                });
                (row.party_id, totals)
            })
            .collect())
    }

    async fn account_entries(
        &self,
        account_code: &str,
        range: DateRange,
        page: PageRequest,
    ) -> Result<EntryPage, LedgerError> {
        let condition = effective()
            .add(ledger_entries::Column::AccountCode.eq(account_code))
            .add(within(range));

        let total = ledger_entries::Entity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await
            .map_err(db_error)?;

        let mut carried = EntryTotals::default();
        if page.offset() > 0 {
            let head: Vec<(Decimal, Decimal)> =
                in_statement_order(ledger_entries::Entity::find().filter(condition.clone()))
                    .select_only()
                    .column(ledger_entries::Column::Debit)
                    .column(ledger_entries::Column::Credit)
                    .limit(page.offset())
                    .into_tuple()
                    .all(&self.db)
                    .await
                    .map_err(db_error)?;
            for (debit, credit) in head {
                carried.add(debit, credit);
            }
        }

        let rows = in_statement_order(ledger_entries::Entity::find().filter(condition))
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(EntryPage {
            entries: entries_from_models(rows)?,
            total,
            carried,
        })
    }

    async fn party_census(
        &self,
        account_code: &str,
        party: Party,
        as_of: Option<NaiveDate>,
    ) -> Result<PartyCensus, LedgerError> {
        let party_column = match party.kind() {
            PartyKind::Customer => "customer_id",
            PartyKind::Supplier => "supplier_id",
        };
        let sql = format!(
            r"
SELECT
    COUNT(*) FILTER (WHERE account_code = $1 AND reversed_at IS NULL AND status = 'completed'
                     AND ($3::date IS NULL OR transaction_date <= $3::date)) AS live_in_range,
    COUNT(*) FILTER (WHERE account_code = $1 AND reversed_at IS NULL AND status = 'completed') AS live_total,
    COUNT(*) FILTER (WHERE account_code = $1 AND reversed_at IS NOT NULL) AS reversed,
    COUNT(*) FILTER (WHERE account_code = $1 AND status <> 'completed') AS not_completed,
    COUNT(*) FILTER (WHERE account_code <> $1) AS other_accounts
FROM ledger_entries
WHERE {party_column} = $2"
        );
        let row = CensusRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [account_code.into(), party.id().into(), as_of.into()],
        ))
        .one(&self.db)
        .await
        .map_err(db_error)?;

        Ok(row.map_or_else(PartyCensus::default, |row| PartyCensus {
            live_in_range: row.live_in_range.unsigned_abs(),
            live_total: row.live_total.unsigned_abs(),
            reversed: row.reversed.unsigned_abs(),
            not_completed: row.not_completed.unsigned_abs(),
            other_accounts: row.other_accounts.unsigned_abs(),
        }))
    }

    async fn unbalanced_groups(&self) -> Result<Vec<GroupImbalance>, LedgerError> {
        let rows = GroupRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            r"
SELECT transaction_id, SUM(debit) AS debit, SUM(credit) AS credit
FROM ledger_entries
WHERE reversed_at IS NULL AND status = 'completed'
GROUP BY transaction_id
HAVING ABS(SUM(debit) - SUM(credit)) >= 0.01
ORDER BY transaction_id",
        ))
        .all(&self.db)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| GroupImbalance {
                transaction_id: TransactionId::from_uuid(row.transaction_id),
                debit: row.debit,
                credit: row.credit,
            })
            .collect())
    }

    async fn malformed_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let well_formed = Condition::any()
            .add(
                Condition::all()
                    .add(ledger_entries::Column::Debit.gt(Decimal::ZERO))
                    .add(ledger_entries::Column::Credit.eq(Decimal::ZERO)),
            )
            .add(
                Condition::all()
                    .add(ledger_entries::Column::Debit.eq(Decimal::ZERO))
                    .add(ledger_entries::Column::Credit.gt(Decimal::ZERO)),
            );
        let rows = ledger_entries::Entity::find()
            .filter(live())
            .filter(ledger_entries::Column::Status.ne(EntryStatus::Void))
            .filter(well_formed.not())
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        entries_from_models(rows)
    }
}
