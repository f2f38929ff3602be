//! Business rule validation for posting groups.

use ledgerline_shared::types::{round_money, within_tolerance};
use rust_decimal::Decimal;

use super::error::{AccountRejection, LedgerError};
use super::types::{GroupTotals, PostingLine};
use crate::chart::Account;

/// Rounds every line amount to ledger precision.
#[must_use]
pub fn normalize_lines(lines: Vec<PostingLine>) -> Vec<PostingLine> {
    lines
        .into_iter()
        .map(|mut line| {
            line.debit = round_money(line.debit);
            line.credit = round_money(line.credit);
            line
        })
        .collect()
}

/// Validates a set of posting lines.
///
/// Checks, in order: at least 2 lines, exactly one positive side per line,
/// every account exists and accepts postings, debits equal credits within one cent.
///
/// # Errors
///
/// Returns the first rule the lines violate.
pub fn validate_posting<'a, F>(
    lines: &[PostingLine],
    account_lookup: F,
) -> Result<GroupTotals, LedgerError>
where
    F: Fn(&str) -> Option<&'a Account>,
{
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientEntries);
    }

    let mut totals = GroupTotals::default();

    for (index, line) in lines.iter().enumerate() {
        let has_debit = line.debit > Decimal::ZERO;
        let has_credit = line.credit > Decimal::ZERO;
        if has_debit == has_credit || line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::InvalidEntryShape { line: index });
        }

        check_account(&line.account_code, account_lookup(&line.account_code))?;

        totals.debit += line.debit;
        totals.credit += line.credit;
    }

    if !within_tolerance(totals.debit, totals.credit) {
        return Err(LedgerError::UnbalancedGroup {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}

fn check_account(code: &str, account: Option<&Account>) -> Result<(), LedgerError> {
    let reason = match account {
        None => AccountRejection::NotFound,
        Some(account) if !account.is_active => AccountRejection::Inactive,
        Some(account) if !account.allow_direct_posting => AccountRejection::NoDirectPosting,
        Some(_) => return Ok(()),
    };
    Err(LedgerError::InvalidAccount {
        code: code.to_string(),
        reason,
    })
}
