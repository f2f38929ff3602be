//! Ledgerline reconciliation job.
//!
//! Compares cached customer/supplier balances against the ledger and scans the
//! ledger for unbalanced groups and malformed entries.
//!
//! Usage:
//!   reconciler once [all|customers|suppliers] [--auto-correct]
//!   reconciler validate
//!   reconciler schedule
//!
//! `schedule` runs an alert-only pass every `reconciliation.alert_interval_hours`
//! and auto-corrects on every `reconciliation.auto_correct_every_runs`-th pass.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use ledgerline_core::chart::AccountMap;
use ledgerline_core::ledger::{LedgerService, LedgerStore};
use ledgerline_core::reconciliation::{ReconcileScope, Reconciler};
use ledgerline_db::{LedgerRepository, PartyRepository, connect_with};
use ledgerline_shared::AppConfig;
use ledgerline_shared::config::LoggingConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type JobReconciler = Reconciler<LedgerRepository, PartyRepository>;

#[derive(Debug, Parser)]
#[command(
    name = "reconciler",
    about = "Reconciles cached party balances and validates the ledger",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Run one reconciliation pass and print the report
    Once {
        /// all, customers or suppliers (defaults to `reconciliation.scope`)
        scope: Option<ReconcileScope>,
        /// Overwrite drifted cached balances with the ledger value
        #[arg(long)]
        auto_correct: bool,
    },
    /// Scan for unbalanced groups and malformed entries
    Validate,
    /// Run passes on the configured interval until interrupted
    Schedule,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.clone().into());
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Whether the `run`-th scheduled pass (1-based) auto-corrects.
fn is_correction_run(run: u64, every: u32) -> bool {
    every > 0 && run % u64::from(every) == 0
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let Cli { command } = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let store = Arc::new(LedgerRepository::new(db.clone()));
    let chart = store.list_accounts().await?;
    let accounts = AccountMap::resolve(&chart, &config.ledger.account_roles)?;
    let ledger = LedgerService::new(store, accounts, config.ledger.default_currency.clone());
    let reconciler = Reconciler::new(ledger, Arc::new(PartyRepository::new(db)));

    let default_scope: ReconcileScope = config.reconciliation.scope.parse()?;

    match command {
        Command::Once {
            scope,
            auto_correct,
        } => {
            let report = reconciler
                .reconcile(scope.unwrap_or(default_scope), auto_correct)
                .await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.errors.is_empty() {
                bail!("{} parties could not be reconciled", report.errors.len());
            }
        }
        Command::Validate => {
            let report = reconciler.validate_ledger().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_clean() {
                bail!("ledger integrity check failed");
            }
        }
        Command::Schedule => {
            schedule(&reconciler, &config, default_scope).await;
        }
    }

    Ok(())
}

async fn schedule(reconciler: &JobReconciler, config: &AppConfig, scope: ReconcileScope) {
    let settings = &config.reconciliation;
    let period = Duration::from_secs(settings.alert_interval_hours.max(1).saturating_mul(3600));
    let mut ticker = tokio::time::interval(period);
    let mut run: u64 = 0;

    info!(
        interval_hours = settings.alert_interval_hours,
        auto_correct_every_runs = settings.auto_correct_every_runs,
        ?scope,
        "reconciliation schedule started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested, stopping schedule");
                return;
            }
        }

        run += 1;
        let auto_correct = is_correction_run(run, settings.auto_correct_every_runs);
        run_pass(reconciler, scope, auto_correct, run).await;
    }
}

async fn run_pass(reconciler: &JobReconciler, scope: ReconcileScope, auto_correct: bool, run: u64) {
    let report = reconciler.reconcile(scope, auto_correct).await;
    if report.is_clean() {
        info!(run, checked = report.checked, "reconciliation pass clean");
    } else {
        warn!(
            run,
            checked = report.checked,
            discrepancies = report.discrepancies.len(),
            corrected = report.corrected(),
            failures = report.errors.len(),
            "reconciliation pass found drift"
        );
    }

    match reconciler.validate_ledger().await {
        Ok(integrity) if integrity.is_clean() => {}
        Ok(integrity) => error!(
            run,
            unbalanced_groups = integrity.unbalanced_groups.len(),
            malformed_entries = integrity.malformed_entries.len(),
            "ledger integrity check failed"
        ),
        Err(err) => error!(run, error = %err, "ledger integrity check could not run"),
    }
}
