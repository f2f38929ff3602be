//! Double-entry general ledger.
//!
//! This module implements the ledger engines:
//! - Posting of balanced groups (the only writer of ledger rows)
//! - Reversal and delta adjustments
//! - Balance derivation for accounts and parties
//! - Party opening balances
//! - Store traits and an in-memory store

pub mod balance;
pub mod entry;
pub mod error;
pub mod memory;
pub mod opening;
pub mod reversal;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use balance::{AccountBalance, AccountStatement, PartyDiagnostic, RunningBalance, StatementLine};
pub use entry::LedgerEntry;
pub use error::{AccountRejection, LedgerError};
pub use memory::InMemoryLedgerStore;
pub use opening::{OpeningBalanceOutcome, opening_lines, opening_reference};
pub use reversal::delta_lines;
pub use service::LedgerService;
pub use store::{
    CachedBalance, EntryPage, EntryTotals, GroupImbalance, GroupWrite, HistoricalSales,
    HistoricalSalesSource, LedgerStore, PartyBalanceCache, PartyCensus, WriteMode,
};
pub use types::{
    AccountPair, DateRange, EntryStatus, FieldPatch, GroupTotals, PostedGroup, PostingKind,
    PostingLine, PostingMetadata, ReferenceKey, ReferenceType,
};
pub use validation::{normalize_lines, validate_posting};
