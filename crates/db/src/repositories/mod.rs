//! Repository abstractions for data access.
//!
//! Repositories implement the core store traits over Postgres, hiding the
//! `SeaORM` implementation details from the ledger engines.

pub mod account;
pub mod ledger;
pub mod party;

pub use account::AccountRepository;
pub use ledger::LedgerRepository;
pub use party::PartyRepository;
