//! Chart of accounts.
//!
//! Accounts are identified by a stable `code`. Engines never hardcode codes:
//! they ask an [`AccountMap`] for the account playing a given [`AccountRole`].

pub mod account;
pub mod error;
pub mod party;
pub mod roles;
pub mod standard;

pub use account::{Account, AccountType, NormalBalance};
pub use error::ChartError;
pub use party::{Party, PartyKind};
pub use roles::{AccountMap, AccountRole};
pub use standard::standard_chart;
