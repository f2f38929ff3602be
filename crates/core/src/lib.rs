//! Core ledger logic for Ledgerline.
//!
//! This crate contains the double-entry engine with ZERO web or database dependencies.
//! Persistence sits behind the store traits in [`ledger::store`]; an in-memory store
//! ships here for tests and embedding.
//!
//! # Modules
//!
//! - `chart` - Chart of accounts, account roles, and parties
//! - `ledger` - Posting, reversal, balance derivation, and opening balances
//! - `reconciliation` - Cached party balance audits and ledger integrity checks
//! - `reports` - Profit & Loss, Balance Sheet, and Trial Balance

pub mod chart;
pub mod ledger;
pub mod reconciliation;
pub mod reports;
