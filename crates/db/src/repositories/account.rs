//! Account repository for chart of accounts database operations.
//!
//! Chart management is the only writer of `chart_of_accounts`; the ledger store
//! only reads accounts and refreshes their cached `current_balance`.

use chrono::Utc;
use ledgerline_core::chart::Account;
use ledgerline_core::ledger::LedgerError;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

use crate::entities::chart_of_accounts;
use crate::error::db_error;

/// Maps a chart row into the domain account.
pub(crate) fn account_from_model(model: chart_of_accounts::Model) -> Account {
    Account {
        code: model.code,
        name: model.name,
        account_type: model.account_type.into(),
        normal_balance: model.normal_balance.into(),
        allow_direct_posting: model.allow_direct_posting,
        is_active: model.is_active,
        opening_balance: model.opening_balance,
        parent_code: model.parent_code,
    }
}

fn account_to_active(account: &Account) -> chart_of_accounts::ActiveModel {
    let now = Utc::now().into();
    chart_of_accounts::ActiveModel {
        code: Set(account.code.clone()),
        name: Set(account.name.clone()),
        account_type: Set(account.account_type.into()),
        normal_balance: Set(account.normal_balance.into()),
        parent_code: Set(account.parent_code.clone()),
        is_active: Set(account.is_active),
        allow_direct_posting: Set(account.allow_direct_posting),
        opening_balance: Set(account.opening_balance),
        current_balance: Set(account.opening_balance),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Account repository for chart management.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts missing accounts and refreshes names and structure of existing ones.
    ///
    /// Type and normal balance of an existing account never change, and neither
    /// does its cached balance.
    pub async fn provision(&self, chart: &[Account]) -> Result<u64, LedgerError> {
        if chart.is_empty() {
            return Ok(0);
        }
        let result = chart_of_accounts::Entity::insert_many(chart.iter().map(account_to_active))
            .on_conflict(
                OnConflict::column(chart_of_accounts::Column::Code)
                    .update_columns([
                        chart_of_accounts::Column::Name,
                        chart_of_accounts::Column::ParentCode,
                        chart_of_accounts::Column::AllowDirectPosting,
                        chart_of_accounts::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_error)?;

        info!(accounts = chart.len(), written = result, "chart of accounts provisioned");
        Ok(result)
    }

    /// Finds one account by code.
    pub async fn find(&self, code: &str) -> Result<Option<Account>, LedgerError> {
        let row = chart_of_accounts::Entity::find_by_id(code.to_string())
            .one(&self.db)
            .await
            .map_err(db_error)?;
        Ok(row.map(account_from_model))
    }

    /// Activates or deactivates an account. Inactive accounts reject postings.
    pub async fn set_active(&self, code: &str, is_active: bool) -> Result<(), LedgerError> {
        let result = chart_of_accounts::Entity::update_many()
            .col_expr(chart_of_accounts::Column::IsActive, Expr::value(is_active))
            .col_expr(
                chart_of_accounts::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(chart_of_accounts::Column::Code.eq(code))
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::AccountNotFound(code.to_string()));
        }
        info!(code, is_active, "account activation changed");
        Ok(())
    }

    /// The cached `current_balance` column of an account.
    pub async fn cached_balance(&self, code: &str) -> Result<Option<Decimal>, LedgerError> {
        let row = chart_of_accounts::Entity::find_by_id(code.to_string())
            .one(&self.db)
            .await
            .map_err(db_error)?;
        Ok(row.map(|r| r.current_balance))
    }
}
