//! Operation error types.
//!
//! The failure taxonomy for the creation path. Every variant carries a
//! stable code plus a structured data payload so the upstream handler can
//! translate failures for users without string-matching messages.

use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::limits::Granularity;
use crate::operation::types::Side;

/// Errors that can occur while creating an operation.
///
/// All variants are terminal for the current invocation; nothing is retried
/// internally and no ledger record is written for a failed attempt.
#[derive(Debug, Error)]
pub enum OperationError {
    // ========== Missing / invalid input ==========
    /// No transaction type tag was supplied.
    #[error("Transaction type tag is required")]
    MissingTransactionTypeTag,

    /// A side required by the transaction type was not supplied.
    #[error("{0} participant is required for this transaction type")]
    MissingParticipant(Side),

    /// A required field is absent on a supplied participant.
    #[error("{side} participant is missing required field '{field}'")]
    MissingField {
        /// Which side the field belongs to.
        side: Side,
        /// Name of the absent field.
        field: &'static str,
    },

    /// rawValue or fee is negative.
    #[error("{side} participant field '{field}' cannot be negative")]
    NegativeAmount {
        /// Which side the field belongs to.
        side: Side,
        /// Name of the offending field.
        field: &'static str,
    },

    // ========== Not found ==========
    /// No transaction type matches the supplied tag.
    #[error("Transaction type not found: {0}")]
    TransactionTypeNotFound(String),

    /// Currency symbol does not resolve.
    #[error("Currency not found: {0}")]
    CurrencyNotFound(String),

    /// Wallet identifier does not resolve.
    #[error("Wallet not found: {0}")]
    WalletNotFound(Uuid),

    /// No wallet account exists for (wallet, currency).
    #[error("Wallet account not found for wallet {wallet} and currency {currency}")]
    WalletAccountNotFound {
        /// Wallet identifier.
        wallet: Uuid,
        /// Currency symbol.
        currency: String,
    },

    /// No streamed quotation exists for the currency pair.
    #[error("Quotation not found for {from}/{to}")]
    QuotationNotFound {
        /// Source currency symbol.
        from: String,
        /// Target currency symbol.
        to: String,
    },

    // ========== Not active ==========
    /// Transaction type is deactivated.
    #[error("Transaction type {0} is not active")]
    TransactionTypeNotActive(String),

    /// Currency is deactivated.
    #[error("Currency {0} is not active")]
    CurrencyNotActive(String),

    /// Wallet is deactivated.
    #[error("Wallet {0} is not active")]
    WalletNotActive(Uuid),

    /// Wallet account is deactivated.
    #[error("Wallet account {0} is not active")]
    WalletAccountNotActive(Uuid),

    // ========== Configuration ==========
    /// Transaction type state is an unrecognized value.
    #[error("Transaction type {tag} has unrecognized state '{state}'")]
    UnknownTransactionTypeState {
        /// Transaction type tag.
        tag: String,
        /// The unrecognized state string.
        state: String,
    },

    /// Neither a user limit nor a global limit exists for the limit type.
    #[error("No limit configuration found for limit type {0}")]
    LimitConfigurationMissing(String),

    /// Limit configuration exists but cannot be interpreted.
    #[error("Invalid limit configuration for limit type {limit_type}: {detail}")]
    InvalidLimitConfiguration {
        /// Limit type tag.
        limit_type: String,
        /// What could not be interpreted.
        detail: String,
    },

    /// A master-data record carries a value the core cannot interpret.
    #[error("Invalid {entity} record: {detail}")]
    InvalidMasterData {
        /// Kind of record, e.g. "transaction type".
        entity: &'static str,
        /// What could not be interpreted.
        detail: String,
    },

    // ========== Limit violations (static thresholds) ==========
    /// Single operation value above the effective maximum.
    #[error("Value {value} is above the maximum amount {max}")]
    AboveMaxAmount {
        /// Operation value checked.
        value: Decimal,
        /// Effective maximum.
        max: Decimal,
    },

    /// Single operation value below the effective minimum.
    #[error("Value {value} is below the minimum amount {min}")]
    BelowMinAmount {
        /// Operation value checked.
        value: Decimal,
        /// Effective minimum.
        min: Decimal,
    },

    /// Single operation value above the effective nightly maximum.
    #[error("Value {value} is above the nightly maximum amount {max}")]
    AboveMaxAmountNightly {
        /// Operation value checked.
        value: Decimal,
        /// Effective nightly maximum.
        max: Decimal,
    },

    /// Single operation value below the effective nightly minimum.
    #[error("Value {value} is below the nightly minimum amount {min}")]
    BelowMinAmountNightly {
        /// Operation value checked.
        value: Decimal,
        /// Effective nightly minimum.
        min: Decimal,
    },

    // ========== Accumulated-limit violation ==========
    /// Accumulated usage plus this operation would exceed the cap.
    ///
    /// Distinct from the static threshold errors: this signals exhaustion
    /// of accumulated allowance, not an oversized single operation.
    #[error("Available {granularity} limit exceeded: used {used} + {value} > {cap}")]
    AvailableLimitExceeded {
        /// Which accumulation window was exhausted.
        granularity: Granularity,
        /// Usage already accumulated in the window.
        used: Decimal,
        /// Value of the operation being created.
        value: Decimal,
        /// Effective cap for the window.
        cap: Decimal,
    },

    // ========== Funds ==========
    /// Balance (and credit line, where applicable) cannot cover the value.
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Amount the operation needs.
        required: Decimal,
        /// Amount actually available.
        available: Decimal,
    },
}

impl OperationError {
    /// Returns the stable error code for user-facing translation.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingTransactionTypeTag
            | Self::MissingParticipant(_)
            | Self::MissingField { .. } => "MISSING_DATA",
            Self::NegativeAmount { .. } => "INVALID_FORMAT",
            Self::TransactionTypeNotFound(_) => "TRANSACTION_TYPE_NOT_FOUND",
            Self::CurrencyNotFound(_) => "CURRENCY_NOT_FOUND",
            Self::WalletNotFound(_) => "WALLET_NOT_FOUND",
            Self::WalletAccountNotFound { .. } => "WALLET_ACCOUNT_NOT_FOUND",
            Self::QuotationNotFound { .. } => "QUOTATION_NOT_FOUND",
            Self::TransactionTypeNotActive(_) => "TRANSACTION_TYPE_NOT_ACTIVE",
            Self::CurrencyNotActive(_) => "CURRENCY_NOT_ACTIVE",
            Self::WalletNotActive(_) => "WALLET_NOT_ACTIVE",
            Self::WalletAccountNotActive(_) => "WALLET_ACCOUNT_NOT_ACTIVE",
            Self::UnknownTransactionTypeState { .. } => "TRANSACTION_TYPE_STATE_UNKNOWN",
            Self::LimitConfigurationMissing(_) => "LIMIT_CONFIGURATION_MISSING",
            Self::InvalidLimitConfiguration { .. } => "LIMIT_CONFIGURATION_INVALID",
            Self::InvalidMasterData { .. } => "MASTER_DATA_INVALID",
            Self::AboveMaxAmount { .. } => "ABOVE_MAX_AMOUNT",
            Self::BelowMinAmount { .. } => "BELOW_MIN_AMOUNT",
            Self::AboveMaxAmountNightly { .. } => "ABOVE_MAX_AMOUNT_NIGHTLY",
            Self::BelowMinAmountNightly { .. } => "BELOW_MIN_AMOUNT_NIGHTLY",
            Self::AvailableLimitExceeded { .. } => "AVAILABLE_LIMIT_EXCEEDED",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
        }
    }

    /// Returns the structured data payload for this error.
    #[must_use]
    pub fn data(&self) -> Value {
        match self {
            Self::MissingTransactionTypeTag => json!({}),
            Self::MissingParticipant(side) => json!({ "side": side.to_string() }),
            Self::MissingField { side, field } | Self::NegativeAmount { side, field } => {
                json!({ "side": side.to_string(), "field": field })
            }
            Self::TransactionTypeNotFound(tag) | Self::TransactionTypeNotActive(tag) => {
                json!({ "tag": tag })
            }
            Self::CurrencyNotFound(symbol) | Self::CurrencyNotActive(symbol) => {
                json!({ "currency": symbol })
            }
            Self::WalletNotFound(id) | Self::WalletNotActive(id) => json!({ "wallet": id }),
            Self::WalletAccountNotFound { wallet, currency } => {
                json!({ "wallet": wallet, "currency": currency })
            }
            Self::WalletAccountNotActive(id) => json!({ "walletAccount": id }),
            Self::QuotationNotFound { from, to } => json!({ "from": from, "to": to }),
            Self::UnknownTransactionTypeState { tag, state } => {
                json!({ "tag": tag, "state": state })
            }
            Self::LimitConfigurationMissing(tag) => json!({ "limitType": tag }),
            Self::InvalidLimitConfiguration { limit_type, detail } => {
                json!({ "limitType": limit_type, "detail": detail })
            }
            Self::InvalidMasterData { entity, detail } => {
                json!({ "entity": entity, "detail": detail })
            }
            Self::AboveMaxAmount { value, max } | Self::AboveMaxAmountNightly { value, max } => {
                json!({ "value": value, "max": max })
            }
            Self::BelowMinAmount { value, min } | Self::BelowMinAmountNightly { value, min } => {
                json!({ "value": value, "min": min })
            }
            Self::AvailableLimitExceeded {
                granularity,
                used,
                value,
                cap,
            } => json!({
                "granularity": granularity.to_string(),
                "used": used,
                "value": value,
                "cap": cap,
            }),
            Self::InsufficientFunds {
                required,
                available,
            } => json!({ "required": required, "available": available }),
        }
    }
}
