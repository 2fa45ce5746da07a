//! Master-data lookups for the operation create path.
//!
//! Every function is generic over [`ConnectionTrait`] so the create path
//! can run them against its open transaction. Persisted enum strings are
//! parsed here; a value the domain layer cannot interpret surfaces as a
//! configuration error rather than a silent mismatch.

use monetra_core::limits::{LimitCheck, PeriodStart};
use monetra_core::operation::resolve::{
    CurrencyInfo, TransactionTypeInfo, WalletAccountInfo, WalletInfo,
};
use monetra_core::operation::types::Participants;
use monetra_core::OperationError;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entities::{currencies, limit_types, transaction_types, wallet_accounts, wallets};

/// A limit type with its enum columns parsed.
#[derive(Debug, Clone)]
pub struct LimitTypeInfo {
    /// Identifier.
    pub id: Uuid,
    /// Unique tag.
    pub tag: String,
    /// Calendar-aligned or rolling-window accounting.
    pub period_start: PeriodStart,
    /// Which side(s) must pass enforcement.
    pub check: LimitCheck,
    /// Home currency for credit-balance valuation.
    pub currency_id: Uuid,
}

fn parse_participants(raw: &str) -> Result<Participants, OperationError> {
    match raw {
        "OWNER" => Ok(Participants::Owner),
        "BENEFICIARY" => Ok(Participants::Beneficiary),
        "BOTH" => Ok(Participants::Both),
        other => Err(OperationError::InvalidMasterData {
            entity: "transaction type",
            detail: format!("unrecognized participants value '{other}'"),
        }),
    }
}

/// Fetches a transaction type by tag.
pub async fn find_transaction_type<C: ConnectionTrait>(
    conn: &C,
    tag: &str,
) -> Result<TransactionTypeInfo, super::RepositoryError> {
    let model = transaction_types::Entity::find()
        .filter(transaction_types::Column::Tag.eq(tag))
        .one(conn)
        .await?
        .ok_or_else(|| OperationError::TransactionTypeNotFound(tag.to_string()))?;

    Ok(TransactionTypeInfo {
        id: model.id,
        tag: model.tag,
        state: model.state,
        participants: parse_participants(&model.participants)?,
        limit_type_id: model.limit_type_id,
    })
}

/// Fetches a currency by symbol.
pub async fn find_currency<C: ConnectionTrait>(
    conn: &C,
    symbol: &str,
) -> Result<CurrencyInfo, super::RepositoryError> {
    let model = currencies::Entity::find()
        .filter(currencies::Column::Symbol.eq(symbol))
        .one(conn)
        .await?
        .ok_or_else(|| OperationError::CurrencyNotFound(symbol.to_string()))?;

    Ok(CurrencyInfo {
        id: model.id,
        symbol: model.symbol,
        decimal_places: model.decimal_places,
        is_active: model.is_active,
    })
}

/// Fetches the symbol of a currency by identifier.
pub async fn currency_symbol<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<String, super::RepositoryError> {
    let model = currencies::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| OperationError::CurrencyNotFound(id.to_string()))?;
    Ok(model.symbol)
}

/// Fetches a wallet by identifier.
pub async fn find_wallet<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<WalletInfo, super::RepositoryError> {
    let model = wallets::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(OperationError::WalletNotFound(id))?;

    Ok(WalletInfo {
        id: model.id,
        user_id: model.user_id,
        is_active: model.is_active,
    })
}

/// Fetches the wallet account for (wallet, currency), holding a row lock
/// until the surrounding transaction ends.
pub async fn find_wallet_account_locked<C: ConnectionTrait>(
    conn: &C,
    wallet_id: Uuid,
    currency: &CurrencyInfo,
) -> Result<wallet_accounts::Model, super::RepositoryError> {
    let model = wallet_accounts::Entity::find()
        .filter(wallet_accounts::Column::WalletId.eq(wallet_id))
        .filter(wallet_accounts::Column::CurrencyId.eq(currency.id))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| OperationError::WalletAccountNotFound {
            wallet: wallet_id,
            currency: currency.symbol.clone(),
        })?;

    Ok(model)
}

/// Parses a wallet account row into the domain view.
pub fn account_info(model: &wallet_accounts::Model) -> Result<WalletAccountInfo, OperationError> {
    let is_active = match model.state.as_str() {
        "ACTIVE" => true,
        "DEACTIVATE" => false,
        other => {
            return Err(OperationError::InvalidMasterData {
                entity: "wallet account",
                detail: format!("unrecognized state '{other}'"),
            })
        }
    };

    Ok(WalletAccountInfo {
        id: model.id,
        balance: model.balance,
        pending_amount: model.pending_amount,
        is_active,
    })
}

/// Fetches a limit type by identifier.
pub async fn find_limit_type<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<LimitTypeInfo, super::RepositoryError> {
    let model = limit_types::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| OperationError::InvalidMasterData {
            entity: "transaction type",
            detail: format!("references missing limit type {id}"),
        })?;

    let period_start =
        PeriodStart::parse(&model.period_start).ok_or_else(|| OperationError::InvalidMasterData {
            entity: "limit type",
            detail: format!("unrecognized period_start '{}'", model.period_start),
        })?;
    let check =
        LimitCheck::parse(&model.check_side).ok_or_else(|| OperationError::InvalidMasterData {
            entity: "limit type",
            detail: format!("unrecognized check_side '{}'", model.check_side),
        })?;

    Ok(LimitTypeInfo {
        id: model.id,
        tag: model.tag,
        period_start,
        check,
        currency_id: model.currency_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn account(state: &str) -> wallet_accounts::Model {
        wallet_accounts::Model {
            id: Uuid::new_v4(),
            wallet_id: Uuid::new_v4(),
            currency_id: Uuid::new_v4(),
            balance: dec!(100),
            pending_amount: dec!(10),
            state: state.to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_parse_participants_values() {
        assert_eq!(parse_participants("OWNER").unwrap(), Participants::Owner);
        assert_eq!(parse_participants("BOTH").unwrap(), Participants::Both);
        assert!(matches!(
            parse_participants("EVERYONE"),
            Err(OperationError::InvalidMasterData { .. })
        ));
    }

    #[test]
    fn test_account_info_parses_state() {
        let info = account_info(&account("ACTIVE")).unwrap();
        assert!(info.is_active);
        assert_eq!(info.balance, dec!(100));

        let info = account_info(&account("DEACTIVATE")).unwrap();
        assert!(!info.is_active);

        assert!(matches!(
            account_info(&account("FROZEN")),
            Err(OperationError::InvalidMasterData { .. })
        ));
    }
}
