//! Initial database migration.
//!
//! Creates the master-data tables, the limit configuration tables, the
//! operations ledger and its supporting tables, plus seed currencies.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: MASTER DATA
        // ============================================================
        db.execute_unprepared(CURRENCIES_SQL).await?;
        db.execute_unprepared(WALLETS_SQL).await?;
        db.execute_unprepared(WALLET_ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 2: LIMIT POLICY
        // ============================================================
        db.execute_unprepared(LIMIT_TYPES_SQL).await?;
        db.execute_unprepared(TRANSACTION_TYPES_SQL).await?;
        db.execute_unprepared(GLOBAL_LIMITS_SQL).await?;
        db.execute_unprepared(USER_LIMITS_SQL).await?;
        db.execute_unprepared(USER_LIMIT_TRACKERS_SQL).await?;

        // ============================================================
        // PART 3: LEDGER
        // ============================================================
        db.execute_unprepared(OPERATIONS_SQL).await?;
        db.execute_unprepared(PENDING_TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 4: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_CURRENCIES_SQL).await?;

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

const CURRENCIES_SQL: &str = r"
CREATE TABLE currencies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    symbol VARCHAR(10) NOT NULL UNIQUE,
    decimal_places SMALLINT NOT NULL DEFAULT 2,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const WALLETS_SQL: &str = r"
CREATE TABLE wallets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_wallets_user ON wallets(user_id);
";

const WALLET_ACCOUNTS_SQL: &str = r"
CREATE TABLE wallet_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    wallet_id UUID NOT NULL REFERENCES wallets(id),
    currency_id UUID NOT NULL REFERENCES currencies(id),
    balance NUMERIC(28, 8) NOT NULL DEFAULT 0,
    pending_amount NUMERIC(28, 8) NOT NULL DEFAULT 0,
    state VARCHAR(20) NOT NULL DEFAULT 'ACTIVE',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (wallet_id, currency_id)
);
";

const LIMIT_TYPES_SQL: &str = r"
CREATE TABLE limit_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tag VARCHAR(50) NOT NULL UNIQUE,
    period_start VARCHAR(20) NOT NULL,
    check_side VARCHAR(20) NOT NULL,
    currency_id UUID NOT NULL REFERENCES currencies(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_period_start CHECK (period_start IN ('DATE', 'INTERVAL')),
    CONSTRAINT chk_check_side CHECK (check_side IN ('OWNER', 'BENEFICIARY', 'BOTH'))
);
";

const TRANSACTION_TYPES_SQL: &str = r"
CREATE TABLE transaction_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tag VARCHAR(50) NOT NULL UNIQUE,
    state VARCHAR(20) NOT NULL DEFAULT 'ACTIVE',
    participants VARCHAR(20) NOT NULL,
    limit_type_id UUID REFERENCES limit_types(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_participants CHECK (participants IN ('OWNER', 'BENEFICIARY', 'BOTH'))
);
";

const GLOBAL_LIMITS_SQL: &str = r"
CREATE TABLE global_limits (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    limit_type_id UUID NOT NULL UNIQUE REFERENCES limit_types(id),
    nightly_limit NUMERIC(28, 8),
    daily_limit NUMERIC(28, 8),
    monthly_limit NUMERIC(28, 8),
    yearly_limit NUMERIC(28, 8),
    max_amount NUMERIC(28, 8),
    min_amount NUMERIC(28, 8),
    max_amount_nightly NUMERIC(28, 8),
    min_amount_nightly NUMERIC(28, 8),
    user_nightly_limit NUMERIC(28, 8),
    user_daily_limit NUMERIC(28, 8),
    user_monthly_limit NUMERIC(28, 8),
    user_yearly_limit NUMERIC(28, 8),
    nighttime_start VARCHAR(5),
    nighttime_end VARCHAR(5),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const USER_LIMITS_SQL: &str = r"
CREATE TABLE user_limits (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    limit_type_id UUID NOT NULL REFERENCES limit_types(id),
    nightly_limit NUMERIC(28, 8),
    daily_limit NUMERIC(28, 8),
    monthly_limit NUMERIC(28, 8),
    yearly_limit NUMERIC(28, 8),
    max_amount NUMERIC(28, 8),
    min_amount NUMERIC(28, 8),
    max_amount_nightly NUMERIC(28, 8),
    min_amount_nightly NUMERIC(28, 8),
    user_nightly_limit NUMERIC(28, 8),
    user_daily_limit NUMERIC(28, 8),
    user_monthly_limit NUMERIC(28, 8),
    user_yearly_limit NUMERIC(28, 8),
    user_max_amount NUMERIC(28, 8),
    user_min_amount NUMERIC(28, 8),
    user_max_amount_nightly NUMERIC(28, 8),
    user_min_amount_nightly NUMERIC(28, 8),
    nighttime_start VARCHAR(5),
    nighttime_end VARCHAR(5),
    credit_balance NUMERIC(28, 8),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (user_id, limit_type_id)
);
";

const USER_LIMIT_TRACKERS_SQL: &str = r"
CREATE TABLE user_limit_trackers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    limit_type_id UUID NOT NULL REFERENCES limit_types(id),
    user_limit_id UUID REFERENCES user_limits(id),
    used_daily_limit NUMERIC(28, 8) NOT NULL DEFAULT 0,
    used_monthly_limit NUMERIC(28, 8) NOT NULL DEFAULT 0,
    used_annual_limit NUMERIC(28, 8) NOT NULL DEFAULT 0,
    used_nightly_limit NUMERIC(28, 8) NOT NULL DEFAULT 0,
    period_start TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (user_id, limit_type_id)
);
";

const OPERATIONS_SQL: &str = r"
CREATE TABLE operations (
    id UUID PRIMARY KEY,
    transaction_type_id UUID NOT NULL REFERENCES transaction_types(id),
    currency_id UUID NOT NULL REFERENCES currencies(id),
    raw_value NUMERIC(28, 8) NOT NULL,
    fee NUMERIC(28, 8) NOT NULL,
    value NUMERIC(28, 8) NOT NULL,
    state VARCHAR(20) NOT NULL DEFAULT 'PENDING',
    description TEXT NOT NULL,
    owner_user_id UUID,
    owner_wallet_account_id UUID REFERENCES wallet_accounts(id),
    beneficiary_user_id UUID,
    beneficiary_wallet_account_id UUID REFERENCES wallet_accounts(id),
    operation_ref UUID,
    owner_requested_raw_value NUMERIC(28, 8),
    owner_requested_fee NUMERIC(28, 8),
    user_limit_tracker_id UUID REFERENCES user_limit_trackers(id),
    analysis_tags JSONB NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_operation_state
        CHECK (state IN ('PENDING', 'ACCEPTED', 'DECLINED', 'REVERTED', 'UNDONE')),
    CONSTRAINT chk_operation_has_side
        CHECK (owner_user_id IS NOT NULL OR beneficiary_user_id IS NOT NULL)
);

CREATE INDEX idx_operations_owner ON operations(owner_user_id);
CREATE INDEX idx_operations_beneficiary ON operations(beneficiary_user_id);
CREATE INDEX idx_operations_type_created ON operations(transaction_type_id, created_at);
";

const PENDING_TRANSACTIONS_SQL: &str = r"
CREATE TABLE pending_wallet_account_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    operation_id UUID NOT NULL,
    wallet_account_id UUID NOT NULL REFERENCES wallet_accounts(id),
    value NUMERIC(28, 8) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_pending_txn_account ON pending_wallet_account_transactions(wallet_account_id);
";

const SEED_CURRENCIES_SQL: &str = r"
INSERT INTO currencies (symbol, decimal_places) VALUES
    ('BRL', 2),
    ('USD', 2),
    ('EUR', 2),
    ('GBP', 2),
    ('BTC', 8)
ON CONFLICT (symbol) DO NOTHING;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS pending_wallet_account_transactions CASCADE;
DROP TABLE IF EXISTS operations CASCADE;
DROP TABLE IF EXISTS user_limit_trackers CASCADE;
DROP TABLE IF EXISTS user_limits CASCADE;
DROP TABLE IF EXISTS global_limits CASCADE;
DROP TABLE IF EXISTS transaction_types CASCADE;
DROP TABLE IF EXISTS limit_types CASCADE;
DROP TABLE IF EXISTS wallet_accounts CASCADE;
DROP TABLE IF EXISTS wallets CASCADE;
DROP TABLE IF EXISTS currencies CASCADE;
";
