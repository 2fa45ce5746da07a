//! Transaction type and participant resolution.
//!
//! Pure validation over caller input and already-fetched master-data
//! records. The database layer performs the lookups and feeds the info
//! structs in; everything here is deterministic and side-effect free.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::OperationError;
use super::types::{ParticipantDraft, ParticipantInput, Participants, Side};

/// Lifecycle state shared by master-data records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Record is usable.
    Active,
    /// Record is disabled.
    Deactivate,
}

impl RecordState {
    /// Parses the persisted state string.
    ///
    /// Returns `None` for unrecognized values; callers decide whether that
    /// is a configuration error or a plain not-active failure.
    #[must_use]
    pub fn parse(state: &str) -> Option<Self> {
        match state {
            "ACTIVE" => Some(Self::Active),
            "DEACTIVATE" => Some(Self::Deactivate),
            _ => None,
        }
    }
}

/// A transaction type as fetched from master data.
#[derive(Debug, Clone)]
pub struct TransactionTypeInfo {
    /// Identifier.
    pub id: Uuid,
    /// Unique tag.
    pub tag: String,
    /// Persisted state string.
    pub state: String,
    /// Which sides are mandatory.
    pub participants: Participants,
    /// Governing limit type, when the type is limit-checked.
    pub limit_type_id: Option<Uuid>,
}

/// A currency as fetched from master data.
#[derive(Debug, Clone)]
pub struct CurrencyInfo {
    /// Identifier.
    pub id: Uuid,
    /// Symbol, e.g. "BRL".
    pub symbol: String,
    /// Number of decimal places.
    pub decimal_places: i16,
    /// Whether the currency is active.
    pub is_active: bool,
}

/// A wallet as fetched from master data.
#[derive(Debug, Clone)]
pub struct WalletInfo {
    /// Identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Whether the wallet is active.
    pub is_active: bool,
}

/// A wallet account as fetched from master data.
#[derive(Debug, Clone)]
pub struct WalletAccountInfo {
    /// Identifier.
    pub id: Uuid,
    /// Available balance.
    pub balance: Decimal,
    /// Amount held for pending operations.
    pub pending_amount: Decimal,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Validates the transaction type record itself.
///
/// An unrecognized state string is a configuration error, not a plain
/// not-active failure; callers must be able to tell the difference.
pub fn validate_transaction_type(info: &TransactionTypeInfo) -> Result<(), OperationError> {
    match RecordState::parse(&info.state) {
        Some(RecordState::Active) => Ok(()),
        Some(RecordState::Deactivate) => {
            Err(OperationError::TransactionTypeNotActive(info.tag.clone()))
        }
        None => Err(OperationError::UnknownTransactionTypeState {
            tag: info.tag.clone(),
            state: info.state.clone(),
        }),
    }
}

/// Checks that every side the transaction type makes mandatory is present.
pub fn validate_required_sides(
    participants: Participants,
    owner: Option<&ParticipantDraft>,
    beneficiary: Option<&ParticipantDraft>,
) -> Result<(), OperationError> {
    if participants.requires_owner() && owner.is_none() {
        return Err(OperationError::MissingParticipant(Side::Owner));
    }
    if participants.requires_beneficiary() && beneficiary.is_none() {
        return Err(OperationError::MissingParticipant(Side::Beneficiary));
    }
    Ok(())
}

/// Validates a supplied participant draft into a concrete input.
///
/// # Errors
///
/// Missing operation identifier, wallet, currency, description, fee or
/// rawValue yield a missing-data error; negative fee or rawValue an
/// invalid-format error.
pub fn validate_participant(
    side: Side,
    draft: &ParticipantDraft,
) -> Result<ParticipantInput, OperationError> {
    let missing = |field: &'static str| OperationError::MissingField { side, field };

    let operation_id = draft.operation_id.ok_or_else(|| missing("operationId"))?;
    let wallet_id = draft.wallet_id.ok_or_else(|| missing("wallet"))?;
    let currency = draft.currency.clone().ok_or_else(|| missing("currency"))?;
    let raw_value = draft.raw_value.ok_or_else(|| missing("rawValue"))?;
    let fee = draft.fee.ok_or_else(|| missing("fee"))?;
    let description = draft
        .description
        .clone()
        .ok_or_else(|| missing("description"))?;

    if raw_value < Decimal::ZERO {
        return Err(OperationError::NegativeAmount {
            side,
            field: "rawValue",
        });
    }
    if fee < Decimal::ZERO {
        return Err(OperationError::NegativeAmount { side, field: "fee" });
    }

    Ok(ParticipantInput {
        operation_id,
        wallet_id,
        currency,
        raw_value,
        fee,
        description,
        allow_available_raw_value: draft.allow_available_raw_value,
    })
}

/// Checks the currency record is usable.
pub fn ensure_currency_active(info: &CurrencyInfo) -> Result<(), OperationError> {
    if info.is_active {
        Ok(())
    } else {
        Err(OperationError::CurrencyNotActive(info.symbol.clone()))
    }
}

/// Checks the wallet record is usable.
pub fn ensure_wallet_active(info: &WalletInfo) -> Result<(), OperationError> {
    if info.is_active {
        Ok(())
    } else {
        Err(OperationError::WalletNotActive(info.id))
    }
}

/// Checks the wallet account record is usable.
pub fn ensure_wallet_account_active(info: &WalletAccountInfo) -> Result<(), OperationError> {
    if info.is_active {
        Ok(())
    } else {
        Err(OperationError::WalletAccountNotActive(info.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn full_draft() -> ParticipantDraft {
        ParticipantDraft {
            operation_id: Some(Uuid::new_v4()),
            wallet_id: Some(Uuid::new_v4()),
            currency: Some("BRL".to_string()),
            raw_value: Some(dec!(1000)),
            fee: Some(dec!(0)),
            description: Some("groceries".to_string()),
            allow_available_raw_value: false,
        }
    }

    fn transaction_type(state: &str, participants: Participants) -> TransactionTypeInfo {
        TransactionTypeInfo {
            id: Uuid::new_v4(),
            tag: "WITHDRAW".to_string(),
            state: state.to_string(),
            participants,
            limit_type_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn test_active_transaction_type_passes() {
        let info = transaction_type("ACTIVE", Participants::Owner);
        assert!(validate_transaction_type(&info).is_ok());
    }

    #[test]
    fn test_deactivated_transaction_type_fails_not_active() {
        let info = transaction_type("DEACTIVATE", Participants::Owner);
        assert!(matches!(
            validate_transaction_type(&info),
            Err(OperationError::TransactionTypeNotActive(_))
        ));
    }

    #[test]
    fn test_unknown_state_is_configuration_error() {
        let info = transaction_type("FROZEN", Participants::Owner);
        let err = validate_transaction_type(&info).unwrap_err();
        assert!(matches!(
            err,
            OperationError::UnknownTransactionTypeState { .. }
        ));
        assert_eq!(err.data()["state"], "FROZEN");
    }

    #[test]
    fn test_missing_owner_side_rejected() {
        let err =
            validate_required_sides(Participants::Owner, None, Some(&full_draft())).unwrap_err();
        assert!(matches!(
            err,
            OperationError::MissingParticipant(Side::Owner)
        ));
    }

    #[test]
    fn test_missing_beneficiary_side_rejected_for_both() {
        let draft = full_draft();
        let err = validate_required_sides(Participants::Both, Some(&draft), None).unwrap_err();
        assert!(matches!(
            err,
            OperationError::MissingParticipant(Side::Beneficiary)
        ));
    }

    #[test]
    fn test_extra_side_is_allowed() {
        // A transaction type requiring only the owner still accepts a
        // supplied beneficiary.
        let owner = full_draft();
        let beneficiary = full_draft();
        assert!(
            validate_required_sides(Participants::Owner, Some(&owner), Some(&beneficiary)).is_ok()
        );
    }

    #[test]
    fn test_validate_participant_complete() {
        let input = validate_participant(Side::Owner, &full_draft()).unwrap();
        assert_eq!(input.raw_value, dec!(1000));
        assert_eq!(input.fee, dec!(0));
    }

    #[test]
    fn test_each_missing_field_is_reported() {
        for (field, mutate) in [
            (
                "operationId",
                Box::new(|d: &mut ParticipantDraft| d.operation_id = None)
                    as Box<dyn Fn(&mut ParticipantDraft)>,
            ),
            ("wallet", Box::new(|d: &mut ParticipantDraft| d.wallet_id = None)),
            ("currency", Box::new(|d: &mut ParticipantDraft| d.currency = None)),
            ("rawValue", Box::new(|d: &mut ParticipantDraft| d.raw_value = None)),
            ("fee", Box::new(|d: &mut ParticipantDraft| d.fee = None)),
            (
                "description",
                Box::new(|d: &mut ParticipantDraft| d.description = None),
            ),
        ] {
            let mut draft = full_draft();
            mutate(&mut draft);
            let err = validate_participant(Side::Owner, &draft).unwrap_err();
            match err {
                OperationError::MissingField { field: f, .. } => assert_eq!(f, field),
                other => panic!("expected MissingField for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let mut draft = full_draft();
        draft.raw_value = Some(dec!(-1));
        assert!(matches!(
            validate_participant(Side::Owner, &draft),
            Err(OperationError::NegativeAmount {
                field: "rawValue",
                ..
            })
        ));

        let mut draft = full_draft();
        draft.fee = Some(dec!(-0.01));
        assert!(matches!(
            validate_participant(Side::Beneficiary, &draft),
            Err(OperationError::NegativeAmount { field: "fee", .. })
        ));
    }

    #[test]
    fn test_inactive_records_rejected() {
        let currency = CurrencyInfo {
            id: Uuid::new_v4(),
            symbol: "BRL".to_string(),
            decimal_places: 2,
            is_active: false,
        };
        assert!(matches!(
            ensure_currency_active(&currency),
            Err(OperationError::CurrencyNotActive(_))
        ));

        let wallet = WalletInfo {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            is_active: false,
        };
        assert!(matches!(
            ensure_wallet_active(&wallet),
            Err(OperationError::WalletNotActive(_))
        ));

        let account = WalletAccountInfo {
            id: Uuid::new_v4(),
            balance: dec!(0),
            pending_amount: dec!(0),
            is_active: false,
        };
        assert!(matches!(
            ensure_wallet_account_active(&account),
            Err(OperationError::WalletAccountNotActive(_))
        ));
    }
}
