//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{MONEY_TOLERANCE, is_effectively_zero, round_money, within_tolerance};
pub use pagination::{PageMeta, PageRequest, PageResponse};
