//! Ledger schema migration.
//!
//! Creates the chart of accounts, party tables with their cached balances, and
//! the append-only ledger entry table with its lookup indexes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(CHART_OF_ACCOUNTS_SQL).await?;
        db.execute_unprepared(CUSTOMERS_SQL).await?;
        db.execute_unprepared(SUPPLIERS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

CREATE TYPE normal_balance AS ENUM ('debit', 'credit');

CREATE TYPE entry_status AS ENUM ('completed', 'pending', 'void');

CREATE TYPE posting_kind AS ENUM ('original', 'adjustment');
";

const CHART_OF_ACCOUNTS_SQL: &str = r"
CREATE TABLE chart_of_accounts (
    code VARCHAR(20) PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    normal_balance normal_balance NOT NULL,
    parent_code VARCHAR(20) REFERENCES chart_of_accounts(code),
    is_active BOOLEAN NOT NULL DEFAULT true,
    allow_direct_posting BOOLEAN NOT NULL DEFAULT true,
    opening_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_coa_type ON chart_of_accounts(account_type);
CREATE INDEX idx_coa_parent ON chart_of_accounts(parent_code) WHERE parent_code IS NOT NULL;
";

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const SUPPLIERS_SQL: &str = r"
CREATE TABLE suppliers (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL,
    account_code VARCHAR(20) NOT NULL REFERENCES chart_of_accounts(code),
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    transaction_date DATE NOT NULL,
    description TEXT NOT NULL,
    reference_type VARCHAR(40) NOT NULL,
    reference_id VARCHAR(100) NOT NULL,
    reference_number VARCHAR(100),
    customer_id UUID REFERENCES customers(id),
    supplier_id UUID REFERENCES suppliers(id),
    status entry_status NOT NULL DEFAULT 'completed',
    posting_kind posting_kind NOT NULL DEFAULT 'original',
    reversed_at TIMESTAMPTZ,
    created_by UUID NOT NULL,
    currency CHAR(3) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_non_negative_amounts CHECK (debit >= 0 AND credit >= 0),
    CONSTRAINT chk_single_party CHECK (customer_id IS NULL OR supplier_id IS NULL)
);

CREATE INDEX idx_le_account_date ON ledger_entries(account_code, transaction_date);
CREATE INDEX idx_le_customer ON ledger_entries(customer_id) WHERE customer_id IS NOT NULL;
CREATE INDEX idx_le_supplier ON ledger_entries(supplier_id) WHERE supplier_id IS NOT NULL;
CREATE INDEX idx_le_reference ON ledger_entries(reference_type, reference_id);
CREATE INDEX idx_le_transaction ON ledger_entries(transaction_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS suppliers CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
DROP TABLE IF EXISTS chart_of_accounts CASCADE;

DROP TYPE IF EXISTS posting_kind;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS normal_balance;
DROP TYPE IF EXISTS account_type;
";
