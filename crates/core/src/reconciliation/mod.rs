//! Reconciliation of cached party balances against the ledger.
//!
//! The ledger always wins: discrepancies are reported and, with
//! auto-correct, the cached column is overwritten with the ledger value.

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::Reconciler;
pub use types::{
    Discrepancy, LedgerIntegrityReport, PartyReconciliation, ReconcileFailure, ReconcileScope,
    ReconcileStatus, ReconciliationReport,
};
