//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All ledger amounts are `rust_decimal::Decimal` rounded to two places, and every
//! comparison against zero or between totals absorbs currency rounding with
//! [`MONEY_TOLERANCE`].

use rust_decimal::{Decimal, RoundingStrategy};

/// Smallest amount the ledger treats as a real difference (one cent).
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Number of decimal places stored for ledger amounts.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to ledger precision using Banker's Rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Returns true if the two amounts differ by less than one cent.
#[must_use]
pub fn within_tolerance(left: Decimal, right: Decimal) -> bool {
    (left - right).abs() < MONEY_TOLERANCE
}

/// Returns true if the amount is zero once rounding noise is absorbed.
#[must_use]
pub fn is_effectively_zero(amount: Decimal) -> bool {
    within_tolerance(amount, Decimal::ZERO)
}
