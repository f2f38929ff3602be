//! Property-based tests for posting validation.
//!
//! Double-entry invariant: balanced groups are accepted, groups whose debits
//! and credits differ by a cent or more are rejected, and malformed lines are
//! rejected wherever they appear.

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::PostingLine;
use super::validation::validate_posting;
use crate::chart::{Account, standard_chart};

/// Postable codes from the standard chart.
const CODES: [&str; 6] = ["1000", "1010", "1100", "1200", "2000", "4000"];

/// Strategy to generate a positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a postable account code.
fn account_code() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CODES.to_vec())
}

fn chart() -> HashMap<String, Account> {
    standard_chart()
        .into_iter()
        .map(|a| (a.code.clone(), a))
        .collect()
}

/// Debit lines for `debits`, balanced by a single credit line.
fn balanced_lines(debits: &[Decimal], debit_codes: &[&str], credit_code: &str) -> Vec<PostingLine> {
    let total: Decimal = debits.iter().copied().sum();
    let mut lines: Vec<PostingLine> = debits
        .iter()
        .zip(debit_codes.iter().cycle())
        .map(|(amount, code)| PostingLine::debit(*code, *amount))
        .collect();
    lines.push(PostingLine::credit(credit_code, total));
    lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any group whose debits equal its credits is accepted.
    #[test]
    fn prop_balanced_groups_accepted(
        debits in prop::collection::vec(positive_amount(), 1..6),
        debit_codes in prop::collection::vec(account_code(), 1..4),
        credit_code in account_code(),
    ) {
        let lines = balanced_lines(&debits, &debit_codes, credit_code);
        let accounts = chart();
        let totals = validate_posting(&lines, |code| accounts.get(code)).unwrap();
        prop_assert_eq!(totals.debit, totals.credit);
        prop_assert_eq!(totals.debit, debits.iter().copied().sum::<Decimal>());
    }

    /// A group off by at least one cent is rejected as unbalanced.
    #[test]
    fn prop_unbalanced_groups_rejected(
        amount in positive_amount(),
        skew_cents in 1i64..100_000i64,
        credit_larger in any::<bool>(),
    ) {
        let skew = Decimal::new(skew_cents, 2);
        let (debit, credit) = if credit_larger { (amount, amount + skew) } else { (amount + skew, amount) };
        let lines = vec![PostingLine::debit("1100", debit), PostingLine::credit("4000", credit)];
        let accounts = chart();
        let result = validate_posting(&lines, |code| accounts.get(code));
        prop_assert!(
            matches!(result, Err(LedgerError::UnbalancedGroup { .. })),
            "expected UnbalancedGroup, got {:?}", result
        );
    }

    /// A zero or double-sided line is rejected no matter where it sits.
    #[test]
    fn prop_malformed_line_rejected(
        amount in positive_amount(),
        position in 0usize..3,
        double_sided in any::<bool>(),
    ) {
        let mut lines = vec![
            PostingLine::debit("1000", amount),
            PostingLine::credit("4000", amount),
        ];
        let bad = if double_sided {
            let mut line = PostingLine::debit("1010", amount);
            line.credit = amount;
            line
        } else {
            PostingLine::debit("1010", Decimal::ZERO)
        };
        lines.insert(position, bad);

        let accounts = chart();
        let result = validate_posting(&lines, |code| accounts.get(code));
        prop_assert!(
            matches!(result, Err(LedgerError::InvalidEntryShape { line }) if line == position),
            "expected InvalidEntryShape at {}, got {:?}", position, result
        );
    }

    /// Negative amounts are never accepted.
    #[test]
    fn prop_negative_amount_rejected(amount in positive_amount()) {
        let lines = vec![
            PostingLine::debit("1000", -amount),
            PostingLine::credit("4000", -amount),
        ];
        let accounts = chart();
        prop_assert!(validate_posting(&lines, |code| accounts.get(code)).is_err());
    }
}
