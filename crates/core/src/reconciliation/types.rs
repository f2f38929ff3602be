//! Reconciliation report types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chart::{Party, PartyKind};
use crate::ledger::{GroupImbalance, LedgerEntry, LedgerError};

/// Which parties a reconciliation pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileScope {
    /// Customers and suppliers.
    All,
    /// Customers only.
    Customers,
    /// Suppliers only.
    Suppliers,
}

impl ReconcileScope {
    /// Party kinds covered by the scope.
    #[must_use]
    pub fn kinds(self) -> &'static [PartyKind] {
        match self {
            Self::All => &[PartyKind::Customer, PartyKind::Supplier],
            Self::Customers => &[PartyKind::Customer],
            Self::Suppliers => &[PartyKind::Supplier],
        }
    }
}

impl std::str::FromStr for ReconcileScope {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "customers" | "customer" => Ok(Self::Customers),
            "suppliers" | "supplier" => Ok(Self::Suppliers),
            other => Err(LedgerError::Store(format!("unknown reconciliation scope: {other}"))),
        }
    }
}

/// A party whose cached balance differs from the ledger by at least one cent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// Party kind.
    pub kind: PartyKind,
    /// Party id.
    pub party_id: Uuid,
    /// Value of the cached column.
    pub cached_balance: Decimal,
    /// Ledger-derived balance.
    pub ledger_balance: Decimal,
    /// `ledger_balance - cached_balance`.
    pub delta: Decimal,
    /// True once the cache was overwritten.
    pub corrected: bool,
}

/// A party the pass could not reconcile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileFailure {
    /// Party kind.
    pub kind: PartyKind,
    /// Party id; `None` when the whole kind could not be listed.
    pub party_id: Option<Uuid>,
    /// Error message.
    pub message: String,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Scope covered.
    pub scope: ReconcileScope,
    /// Whether discrepancies were corrected.
    pub auto_correct: bool,
    /// Parties examined.
    pub checked: usize,
    /// Parties whose cache matched the ledger.
    pub matched: usize,
    /// Parties whose cache drifted.
    pub discrepancies: Vec<Discrepancy>,
    /// Parties that could not be reconciled.
    pub errors: Vec<ReconcileFailure>,
    /// Start of the pass.
    pub started_at: DateTime<Utc>,
    /// End of the pass.
    pub finished_at: DateTime<Utc>,
}

impl ReconciliationReport {
    /// Number of discrepancies that were corrected.
    #[must_use]
    pub fn corrected(&self) -> usize {
        self.discrepancies.iter().filter(|d| d.corrected).count()
    }

    /// Returns true if nothing drifted and nothing failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty() && self.errors.is_empty()
    }
}

/// Outcome for a single party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileStatus {
    /// Cache matches the ledger.
    Matched,
    /// Cache differs and was left as is.
    Drifted,
    /// Cache differed and was overwritten.
    Corrected,
}

/// Reconciliation of one party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyReconciliation {
    /// The party.
    pub party: Party,
    /// Cached value before any correction.
    pub cached_balance: Decimal,
    /// Ledger-derived balance.
    pub ledger_balance: Decimal,
    /// `ledger_balance - cached_balance`.
    pub delta: Decimal,
    /// Outcome.
    pub status: ReconcileStatus,
}

/// Findings of a ledger integrity scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerIntegrityReport {
    /// Groups whose live completed entries do not balance.
    pub unbalanced_groups: Vec<GroupImbalance>,
    /// Live entries without exactly one positive side.
    pub malformed_entries: Vec<LedgerEntry>,
    /// When the scan ran.
    pub checked_at: DateTime<Utc>,
}

impl LedgerIntegrityReport {
    /// Returns true if the scan found nothing.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unbalanced_groups.is_empty() && self.malformed_entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parsing() {
        assert_eq!("all".parse::<ReconcileScope>().unwrap(), ReconcileScope::All);
        assert_eq!(" Customers ".parse::<ReconcileScope>().unwrap(), ReconcileScope::Customers);
        assert_eq!("supplier".parse::<ReconcileScope>().unwrap(), ReconcileScope::Suppliers);
        assert!("vendors".parse::<ReconcileScope>().is_err());
    }

    #[test]
    fn test_scope_kinds() {
        assert_eq!(ReconcileScope::All.kinds().len(), 2);
        assert_eq!(ReconcileScope::Suppliers.kinds(), &[PartyKind::Supplier]);
    }
}
