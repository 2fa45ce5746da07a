//! `SeaORM` entity definitions for the ledger schema.

pub mod currencies;
pub mod global_limits;
pub mod limit_types;
pub mod operations;
pub mod pending_wallet_account_transactions;
pub mod transaction_types;
pub mod user_limit_trackers;
pub mod user_limits;
pub mod wallet_accounts;
pub mod wallets;
