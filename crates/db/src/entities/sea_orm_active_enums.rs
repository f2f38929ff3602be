//! Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use ledgerline_core::chart;
use ledgerline_core::ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "normal_balance")]
pub enum NormalBalance {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
pub enum EntryStatus {
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "void")]
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "posting_kind")]
pub enum PostingKind {
    #[sea_orm(string_value = "original")]
    Original,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

impl From<chart::AccountType> for AccountType {
    fn from(value: chart::AccountType) -> Self {
        match value {
            chart::AccountType::Asset => Self::Asset,
            chart::AccountType::Liability => Self::Liability,
            chart::AccountType::Equity => Self::Equity,
            chart::AccountType::Revenue => Self::Revenue,
            chart::AccountType::Expense => Self::Expense,
        }
    }
}

impl From<AccountType> for chart::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<chart::NormalBalance> for NormalBalance {
    fn from(value: chart::NormalBalance) -> Self {
        match value {
            chart::NormalBalance::Debit => Self::Debit,
            chart::NormalBalance::Credit => Self::Credit,
        }
    }
}

impl From<NormalBalance> for chart::NormalBalance {
    fn from(value: NormalBalance) -> Self {
        match value {
            NormalBalance::Debit => Self::Debit,
            NormalBalance::Credit => Self::Credit,
        }
    }
}

impl From<ledger::EntryStatus> for EntryStatus {
    fn from(value: ledger::EntryStatus) -> Self {
        match value {
            ledger::EntryStatus::Completed => Self::Completed,
            ledger::EntryStatus::Pending => Self::Pending,
            ledger::EntryStatus::Void => Self::Void,
        }
    }
}

impl From<EntryStatus> for ledger::EntryStatus {
    fn from(value: EntryStatus) -> Self {
        match value {
            EntryStatus::Completed => Self::Completed,
            EntryStatus::Pending => Self::Pending,
            EntryStatus::Void => Self::Void,
        }
    }
}

impl From<ledger::PostingKind> for PostingKind {
    fn from(value: ledger::PostingKind) -> Self {
        match value {
            ledger::PostingKind::Original => Self::Original,
            ledger::PostingKind::Adjustment => Self::Adjustment,
        }
    }
}

impl From<PostingKind> for ledger::PostingKind {
    fn from(value: PostingKind) -> Self {
        match value {
            PostingKind::Original => Self::Original,
            PostingKind::Adjustment => Self::Adjustment,
        }
    }
}
