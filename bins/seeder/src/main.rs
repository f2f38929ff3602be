//! Database seeder for Ledgerline development and testing.
//!
//! Seeds the standard chart of accounts, a demo customer and supplier, and
//! their opening balances. Safe to re-run: the chart is upserted and opening
//! balances replace the previous ones.
//!
//! Usage: cargo run --bin seeder

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use ledgerline_core::chart::{AccountMap, Party, standard_chart};
use ledgerline_core::ledger::{LedgerService, PartyBalanceCache};
use ledgerline_db::{AccountRepository, LedgerRepository, PartyRepository};
use ledgerline_shared::types::{CustomerId, SupplierId, UserId};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Demo customer ID (consistent for all seeds)
const DEMO_CUSTOMER_ID: &str = "00000000-0000-0000-0000-0000000000c1";
/// Demo supplier ID (consistent for all seeds)
const DEMO_SUPPLIER_ID: &str = "00000000-0000-0000-0000-0000000000b1";
/// Seeding user ID
const SEED_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = ledgerline_db::connect(&database_url).await?;

    println!("Seeding chart of accounts...");
    let chart = standard_chart();
    let written = AccountRepository::new(db.clone()).provision(&chart).await?;
    println!("  {written} accounts written");

    let parties = PartyRepository::new(db.clone());
    let customer = Party::Customer(CustomerId::from_uuid(Uuid::from_str(DEMO_CUSTOMER_ID)?));
    let supplier = Party::Supplier(SupplierId::from_uuid(Uuid::from_str(DEMO_SUPPLIER_ID)?));

    println!("Seeding demo parties...");
    seed_party(&parties, customer, "Demo Customer").await?;
    seed_party(&parties, supplier, "Demo Supplier").await?;

    println!("Seeding opening balances...");
    let ledger = LedgerService::new(
        Arc::new(LedgerRepository::new(db.clone())),
        AccountMap::resolve(&chart, &std::collections::HashMap::new())?,
        "USD",
    );
    let as_of = NaiveDate::from_ymd_opt(2026, 1, 1).context("invalid opening date")?;
    let seeder = UserId::from_uuid(Uuid::from_str(SEED_USER_ID)?);
    for (party, amount) in [(customer, Decimal::new(125_000, 2)), (supplier, Decimal::new(80_000, 2))] {
        let outcome = ledger
            .set_party_opening_balance(party, amount, as_of, seeder)
            .await?;
        println!("  {party}: {amount} (replaced {} entries)", outcome.reversed);
    }

    println!("Seeding complete!");
    Ok(())
}

/// Registers a party unless it already exists.
async fn seed_party(parties: &PartyRepository, party: Party, name: &str) -> anyhow::Result<()> {
    if parties.cached_balance(party).await?.is_some() {
        println!("  {party} already exists, skipping...");
        return Ok(());
    }
    parties.register(party, name).await?;
    Ok(())
}
