//! Application configuration management.

use std::collections::HashMap;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger engine settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Reconciliation job settings.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger engine settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Currency code stamped on postings when the caller does not supply one.
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// First month (1-12) of the fiscal year, used for retained earnings.
    #[serde(default = "default_fiscal_year_start_month")]
    pub fiscal_year_start_month: u32,
    /// Role name to account code overrides (e.g. `accounts_receivable = "1150"`).
    #[serde(default)]
    pub account_roles: HashMap<String, String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_fiscal_year_start_month() -> u32 {
    1
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            fiscal_year_start_month: default_fiscal_year_start_month(),
            account_roles: HashMap::new(),
        }
    }
}

/// Reconciliation job settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// Hours between alert-only reconciliation passes.
    #[serde(default = "default_alert_interval_hours")]
    pub alert_interval_hours: u64,
    /// Every Nth scheduled pass runs with auto-correct enabled (0 disables).
    #[serde(default = "default_auto_correct_every_runs")]
    pub auto_correct_every_runs: u32,
    /// Which parties to reconcile: `all`, `customers`, or `suppliers`.
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_alert_interval_hours() -> u64 {
    24
}

fn default_auto_correct_every_runs() -> u32 {
    7
}

fn default_scope() -> String {
    "all".to_string()
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            alert_interval_hours: default_alert_interval_hours(),
            auto_correct_every_runs: default_auto_correct_every_runs(),
            scope: default_scope(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "ledgerline=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("LEDGERLINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
