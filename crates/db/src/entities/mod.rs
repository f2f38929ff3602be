//! `SeaORM` entity definitions.

pub mod chart_of_accounts;
pub mod customers;
pub mod ledger_entries;
pub mod sea_orm_active_enums;
pub mod suppliers;
