//! Statement generation against the ledger store.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use super::error::ReportError;
use super::service::{ReportService, fiscal_year_start};
use super::types::{BalanceSheet, EquityRollForward, ProfitAndLoss, TrialBalance};
use crate::ledger::{
    DateRange, HistoricalSales, HistoricalSalesSource, LedgerError, LedgerService, LedgerStore,
};

/// Historical source used when no fallback is configured. Always reports zero sales.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistoricalSales;

impl HistoricalSalesSource for NoHistoricalSales {
    async fn sales_totals(
        &self,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<HistoricalSales, LedgerError> {
        Ok(HistoricalSales::default())
    }
}

/// Builds financial statements from ledger-derived balances.
pub struct StatementGenerator<S, H = NoHistoricalSales> {
    ledger: LedgerService<S>,
    history: Option<Arc<H>>,
    fiscal_year_start_month: u32,
}

impl<S, H> Clone for StatementGenerator<S, H> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            history: self.history.clone(),
            fiscal_year_start_month: self.fiscal_year_start_month,
        }
    }
}

impl<S: LedgerStore> StatementGenerator<S> {
    /// Creates a generator without a historical fallback.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFiscalYearStart` if the month is not in 1..=12.
    pub fn new(ledger: LedgerService<S>, fiscal_year_start_month: u32) -> Result<Self, ReportError> {
        if !(1..=12).contains(&fiscal_year_start_month) {
            return Err(ReportError::InvalidFiscalYearStart(fiscal_year_start_month));
        }
        Ok(Self {
            ledger,
            history: None,
            fiscal_year_start_month,
        })
    }
}

impl<S: LedgerStore, H: HistoricalSalesSource> StatementGenerator<S, H> {
    /// Consults `history` for periods with no ledger postings.
    #[must_use]
    pub fn with_history<H2: HistoricalSalesSource>(self, history: Arc<H2>) -> StatementGenerator<S, H2> {
        StatementGenerator {
            ledger: self.ledger,
            history: Some(history),
            fiscal_year_start_month: self.fiscal_year_start_month,
        }
    }

    /// Profit and loss for `[from, to]`. `from = None` covers everything up to `to`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from` is after `to`, or a ledger error.
    #[instrument(skip(self))]
    pub async fn profit_and_loss(
        &self,
        from: Option<NaiveDate>,
        to: NaiveDate,
    ) -> Result<ProfitAndLoss, ReportError> {
        if let Some(start) = from
            && start > to
        {
            return Err(ReportError::InvalidDateRange { start, end: to });
        }

        let store = self.ledger.store();
        let accounts = store.list_accounts().await?;
        let range = DateRange { from, to: Some(to) };
        let totals = store.totals_by_account(range).await?;
        let currency = self.ledger.default_currency();

        if totals.is_empty()
            && let (Some(history), Some(start)) = (&self.history, from)
        {
            let sales = history.sales_totals(start, to).await?;
            info!(%start, %to, "no ledger postings in period, using source sales records");
            return Ok(ReportService::profit_and_loss_from_sales(
                sales,
                &accounts,
                self.ledger.accounts(),
                start,
                to,
                currency,
            ));
        }

        Ok(ReportService::profit_and_loss(
            &accounts,
            &totals,
            self.ledger.accounts(),
            from,
            to,
            currency,
        ))
    }

    /// Balance sheet as of a date, with retained earnings rolled forward.
    ///
    /// # Errors
    ///
    /// Returns a ledger error if the store fails.
    #[instrument(skip(self))]
    pub async fn balance_sheet(&self, as_of: NaiveDate) -> Result<BalanceSheet, ReportError> {
        let fy_start = fiscal_year_start(as_of, self.fiscal_year_start_month)?;

        let current = self.ledger_profit_and_loss(Some(fy_start), as_of).await?;
        let prior_net_income = match fy_start.pred_opt() {
            Some(prior_end) => self.ledger_profit_and_loss(None, prior_end).await?.net_income,
            None => Decimal::ZERO,
        };

        let store = self.ledger.store();
        let accounts = store.list_accounts().await?;
        let totals = store.totals_by_account(DateRange::as_of(Some(as_of))).await?;

        Ok(ReportService::balance_sheet(
            &accounts,
            &totals,
            self.ledger.accounts(),
            as_of,
            EquityRollForward {
                prior_net_income,
                current_net_income: current.net_income,
            },
            self.ledger.default_currency(),
        ))
    }

    /// Trial balance as of a date.
    ///
    /// # Errors
    ///
    /// Returns a ledger error if the store fails.
    pub async fn trial_balance(&self, as_of: NaiveDate) -> Result<TrialBalance, ReportError> {
        let store = self.ledger.store();
        let accounts = store.list_accounts().await?;
        let totals = store.totals_by_account(DateRange::as_of(Some(as_of))).await?;
        Ok(ReportService::trial_balance(
            &accounts,
            &totals,
            as_of,
            self.ledger.default_currency(),
        ))
    }

    /// Profit and loss from ledger entries only. Never uses the historical fallback.
    async fn ledger_profit_and_loss(
        &self,
        from: Option<NaiveDate>,
        to: NaiveDate,
    ) -> Result<ProfitAndLoss, ReportError> {
        let store = self.ledger.store();
        let accounts = store.list_accounts().await?;
        let totals = store
            .totals_by_account(DateRange { from, to: Some(to) })
            .await?;
        Ok(ReportService::profit_and_loss(
            &accounts,
            &totals,
            self.ledger.accounts(),
            from,
            to,
            self.ledger.default_currency(),
        ))
    }
}
