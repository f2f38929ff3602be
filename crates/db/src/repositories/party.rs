//! Party repository: the cached `current_balance` of customers and suppliers.

use chrono::{DateTime, FixedOffset, Utc};
use ledgerline_core::chart::{Party, PartyKind};
use ledgerline_core::ledger::{CachedBalance, LedgerError, PartyBalanceCache};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

use crate::entities::{customers, suppliers};
use crate::error::db_error;

/// Customer and supplier balance cache backed by the party tables.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    db: DatabaseConnection,
}

impl PartyRepository {
    /// Creates a new party repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a party record with a zero cached balance.
    pub async fn register(&self, party: Party, name: &str) -> Result<(), LedgerError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        match party.kind() {
            PartyKind::Customer => {
                customers::Entity::insert(customers::ActiveModel {
                    id: Set(party.id()),
                    name: Set(name.to_string()),
                    current_balance: Set(Decimal::ZERO),
                    created_at: Set(now),
                    updated_at: Set(now),
                })
                .exec_without_returning(&self.db)
                .await
                .map_err(db_error)?;
            }
            PartyKind::Supplier => {
                suppliers::Entity::insert(suppliers::ActiveModel {
                    id: Set(party.id()),
                    name: Set(name.to_string()),
                    current_balance: Set(Decimal::ZERO),
                    created_at: Set(now),
                    updated_at: Set(now),
                })
                .exec_without_returning(&self.db)
                .await
                .map_err(db_error)?;
            }
        }
        Ok(())
    }
}

impl PartyBalanceCache for PartyRepository {
    async fn cached_balances(&self, kind: PartyKind) -> Result<Vec<CachedBalance>, LedgerError> {
        let rows: Vec<(Uuid, Decimal)> = match kind {
            PartyKind::Customer => customers::Entity::find()
                .select_only()
                .column(customers::Column::Id)
                .column(customers::Column::CurrentBalance)
                .order_by_asc(customers::Column::Id)
                .into_tuple::<(Uuid, Decimal)>()
                .all(&self.db)
                .await,
            PartyKind::Supplier => suppliers::Entity::find()
                .select_only()
                .column(suppliers::Column::Id)
                .column(suppliers::Column::CurrentBalance)
                .order_by_asc(suppliers::Column::Id)
                .into_tuple::<(Uuid, Decimal)>()
                .all(&self.db)
                .await,
        }
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|(party_id, balance)| CachedBalance { party_id, balance })
            .collect())
    }

    async fn cached_balance(&self, party: Party) -> Result<Option<Decimal>, LedgerError> {
        match party.kind() {
            PartyKind::Customer => customers::Entity::find_by_id(party.id())
                .one(&self.db)
                .await
                .map(|row| row.map(|r| r.current_balance)),
            PartyKind::Supplier => suppliers::Entity::find_by_id(party.id())
                .one(&self.db)
                .await
                .map(|row| row.map(|r| r.current_balance)),
        }
        .map_err(db_error)
    }

    async fn overwrite_balance(&self, party: Party, balance: Decimal) -> Result<(), LedgerError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let result = match party.kind() {
            PartyKind::Customer => {
                customers::Entity::update_many()
                    .col_expr(customers::Column::CurrentBalance, Expr::value(balance))
                    .col_expr(customers::Column::UpdatedAt, Expr::value(now))
                    .filter(customers::Column::Id.eq(party.id()))
                    .exec(&self.db)
                    .await
            }
            PartyKind::Supplier => {
                suppliers::Entity::update_many()
                    .col_expr(suppliers::Column::CurrentBalance, Expr::value(balance))
                    .col_expr(suppliers::Column::UpdatedAt, Expr::value(now))
                    .filter(suppliers::Column::Id.eq(party.id()))
                    .exec(&self.db)
                    .await
            }
        }
        .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::PartyNotFound(party));
        }
        Ok(())
    }
}
