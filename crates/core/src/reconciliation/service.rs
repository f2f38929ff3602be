//! Reconciliation job.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use ledgerline_shared::types::within_tolerance;
use rust_decimal::Decimal;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::types::{
    Discrepancy, LedgerIntegrityReport, PartyReconciliation, ReconcileFailure, ReconcileScope,
    ReconcileStatus, ReconciliationReport,
};
use crate::chart::{Party, PartyKind};
use crate::ledger::{CachedBalance, LedgerError, LedgerService, LedgerStore, PartyBalanceCache};

/// Compares cached party balances with ledger-derived balances.
pub struct Reconciler<S, C> {
    ledger: LedgerService<S>,
    cache: Arc<C>,
}

impl<S: LedgerStore, C: PartyBalanceCache> Reconciler<S, C> {
    /// Creates a reconciler.
    #[must_use]
    pub fn new(ledger: LedgerService<S>, cache: Arc<C>) -> Self {
        Self { ledger, cache }
    }

    /// Reconciles every party in `scope`.
    ///
    /// A failure for one party is recorded in the report and never aborts the pass.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, scope: ReconcileScope, auto_correct: bool) -> ReconciliationReport {
        let started_at = Utc::now();
        let mut report = ReconciliationReport {
            scope,
            auto_correct,
            checked: 0,
            matched: 0,
            discrepancies: Vec::new(),
            errors: Vec::new(),
            started_at,
            finished_at: started_at,
        };

        for &kind in scope.kinds() {
            self.reconcile_kind(kind, auto_correct, &mut report).await;
        }

        report.finished_at = Utc::now();
        info!(
            checked = report.checked,
            matched = report.matched,
            discrepancies = report.discrepancies.len(),
            corrected = report.corrected(),
            errors = report.errors.len(),
            "reconciliation finished"
        );
        report
    }

    async fn reconcile_kind(&self, kind: PartyKind, auto_correct: bool, report: &mut ReconciliationReport) {
        let cached = match self.cache.cached_balances(kind).await {
            Ok(cached) => cached,
            Err(err) => {
                error!(%kind, error = %err, "could not list cached balances");
                report.errors.push(ReconcileFailure {
                    kind,
                    party_id: None,
                    message: err.to_string(),
                });
                return;
            }
        };

        let ids: Vec<Uuid> = cached.iter().map(|c| c.party_id).collect();
        let ledger_balances = self.ledger_balances(kind, &ids).await;

        for CachedBalance { party_id, balance } in cached {
            report.checked += 1;
            let ledger_balance = match ledger_balances.get(&party_id) {
                Some(Ok(value)) => *value,
                Some(Err(message)) => {
                    report.errors.push(ReconcileFailure {
                        kind,
                        party_id: Some(party_id),
                        message: message.clone(),
                    });
                    continue;
                }
                None => Decimal::ZERO,
            };

            if within_tolerance(balance, ledger_balance) {
                report.matched += 1;
                continue;
            }

            let party = Party::from_parts(kind, party_id);
            warn!(
                %party,
                cached = %balance,
                ledger = %ledger_balance,
                "cached party balance drifted from ledger"
            );

            let mut corrected = false;
            if auto_correct {
                match self.cache.overwrite_balance(party, ledger_balance).await {
                    Ok(()) => corrected = true,
                    Err(err) => {
                        error!(%party, error = %err, "could not correct cached balance");
                        report.errors.push(ReconcileFailure {
                            kind,
                            party_id: Some(party_id),
                            message: err.to_string(),
                        });
                    }
                }
            }

            report.discrepancies.push(Discrepancy {
                kind,
                party_id,
                cached_balance: balance,
                ledger_balance,
                delta: ledger_balance - balance,
                corrected,
            });
        }
    }

    /// Ledger balances for `ids`, bulk first, then one party at a time if the
    /// bulk aggregate fails.
    async fn ledger_balances(&self, kind: PartyKind, ids: &[Uuid]) -> HashMap<Uuid, Result<Decimal, String>> {
        match self.ledger.bulk_party_balances(kind, ids, None).await {
            Ok(balances) => balances.into_iter().map(|(id, b)| (id, Ok(b))).collect(),
            Err(err) => {
                warn!(%kind, error = %err, "bulk balance query failed, falling back to per-party");
                let mut balances = HashMap::with_capacity(ids.len());
                for &id in ids {
                    let party = Party::from_parts(kind, id);
                    let result = self.ledger.party_balance(party, None).await.map_err(|err| {
                        error!(%party, error = %err, "could not derive party balance");
                        err.to_string()
                    });
                    balances.insert(id, result);
                }
                balances
            }
        }
    }

    /// Reconciles a single party on demand.
    ///
    /// # Errors
    ///
    /// Returns `PartyNotFound` if the party has no cached record, or any
    /// ledger, store or cache error.
    pub async fn reconcile_party(
        &self,
        party: Party,
        auto_correct: bool,
    ) -> Result<PartyReconciliation, LedgerError> {
        let cached_balance = self
            .cache
            .cached_balance(party)
            .await?
            .ok_or(LedgerError::PartyNotFound(party))?;
        let ledger_balance = self.ledger.party_balance(party, None).await?;

        let status = if within_tolerance(cached_balance, ledger_balance) {
            ReconcileStatus::Matched
        } else if auto_correct {
            self.cache.overwrite_balance(party, ledger_balance).await?;
            info!(%party, cached = %cached_balance, ledger = %ledger_balance, "cached party balance corrected");
            ReconcileStatus::Corrected
        } else {
            warn!(%party, cached = %cached_balance, ledger = %ledger_balance, "cached party balance drifted from ledger");
            ReconcileStatus::Drifted
        };

        Ok(PartyReconciliation {
            party,
            cached_balance,
            ledger_balance,
            delta: ledger_balance - cached_balance,
            status,
        })
    }

    /// Scans the ledger for unbalanced groups and malformed entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn validate_ledger(&self) -> Result<LedgerIntegrityReport, LedgerError> {
        let store = self.ledger.store();
        let report = LedgerIntegrityReport {
            unbalanced_groups: store.unbalanced_groups().await?,
            malformed_entries: store.malformed_entries().await?,
            checked_at: Utc::now(),
        };

        for group in &report.unbalanced_groups {
            error!(
                transaction_id = %group.transaction_id,
                debit = %group.debit,
                credit = %group.credit,
                "unbalanced ledger group"
            );
        }
        for entry in &report.malformed_entries {
            error!(
                entry_id = %entry.id,
                transaction_id = %entry.transaction_id,
                debit = %entry.debit,
                credit = %entry.credit,
                "malformed ledger entry"
            );
        }
        if report.is_clean() {
            info!("ledger integrity check passed");
        }

        Ok(report)
    }
}
