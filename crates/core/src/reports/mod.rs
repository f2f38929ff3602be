//! Financial statement generation.
//!
//! Pure builders in [`ReportService`] bucket account balances into statements;
//! [`StatementGenerator`] feeds them from the ledger store.
//! - Profit & Loss
//! - Balance Sheet (with retained earnings roll-forward)
//! - Trial Balance

pub mod error;
pub mod generator;
pub mod service;
pub mod types;

#[cfg(test)]
mod generator_props;
#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use generator::{NoHistoricalSales, StatementGenerator};
pub use service::{ReportService, fiscal_year_start};
pub use types::*;
