//! Operation domain types for creation and validation.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which counterparty of an operation a value or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The debited counterparty.
    Owner,
    /// The credited counterparty.
    Beneficiary,
}

impl Side {
    /// Signed value of an operation for this side.
    ///
    /// The fee is always borne by the owner: the owner moves
    /// `rawValue + fee` out, the beneficiary receives `rawValue - fee`.
    #[must_use]
    pub fn signed_value(self, raw_value: Decimal, fee: Decimal) -> Decimal {
        match self {
            Self::Owner => raw_value + fee,
            Self::Beneficiary => raw_value - fee,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Beneficiary => write!(f, "beneficiary"),
        }
    }
}

/// Which sides a transaction type makes mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Participants {
    /// Only the owner side is mandatory.
    Owner,
    /// Only the beneficiary side is mandatory.
    Beneficiary,
    /// Both sides are mandatory.
    Both,
}

impl Participants {
    /// Returns true if the owner side must be supplied.
    #[must_use]
    pub fn requires_owner(self) -> bool {
        matches!(self, Self::Owner | Self::Both)
    }

    /// Returns true if the beneficiary side must be supplied.
    #[must_use]
    pub fn requires_beneficiary(self) -> bool {
        matches!(self, Self::Beneficiary | Self::Both)
    }
}

/// Lifecycle state of an operation.
///
/// Operations are created PENDING; every other state is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationState {
    /// Created, awaiting settlement.
    Pending,
    /// Settled successfully.
    Accepted,
    /// Refused downstream.
    Declined,
    /// Settled, then rolled back.
    Reverted,
    /// Cancelled before settlement.
    Undone,
}

impl OperationState {
    /// Returns true if the state is absorbing.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if operations in this state consume spending allowance.
    ///
    /// REVERTED, DECLINED and UNDONE operations never contribute to usage
    /// accumulation; read paths over historical operations must filter them.
    #[must_use]
    pub fn counts_toward_usage(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }
}

/// One side of an operation as supplied by the caller, before validation.
///
/// Mirrors the upstream request: everything is optional until
/// [`resolve::validate_participant`](crate::operation::resolve::validate_participant)
/// turns it into a [`ParticipantInput`].
#[derive(Debug, Clone, Default)]
pub struct ParticipantDraft {
    /// Caller-supplied, globally unique operation identifier.
    pub operation_id: Option<Uuid>,
    /// Wallet the participant operates through.
    pub wallet_id: Option<Uuid>,
    /// Currency symbol of the movement.
    pub currency: Option<String>,
    /// Requested principal.
    pub raw_value: Option<Decimal>,
    /// Fee, always borne by the owner.
    pub fee: Option<Decimal>,
    /// Human-readable description.
    pub description: Option<String>,
    /// When set on the owner side, cap the debit to what the account covers
    /// instead of failing with insufficient funds.
    pub allow_available_raw_value: bool,
}

/// A validated side of an operation.
#[derive(Debug, Clone)]
pub struct ParticipantInput {
    /// Caller-supplied, globally unique operation identifier.
    pub operation_id: Uuid,
    /// Wallet the participant operates through.
    pub wallet_id: Uuid,
    /// Currency symbol of the movement.
    pub currency: String,
    /// Requested principal (non-negative).
    pub raw_value: Decimal,
    /// Fee (non-negative).
    pub fee: Decimal,
    /// Human-readable description.
    pub description: String,
    /// Owner-side capping flag.
    pub allow_available_raw_value: bool,
}

/// The full creation request, before validation.
#[derive(Debug, Clone, Default)]
pub struct CreateOperationDraft {
    /// Tag of the transaction type governing this operation.
    pub transaction_type_tag: Option<String>,
    /// Owner (debited) side, if any.
    pub owner: Option<ParticipantDraft>,
    /// Beneficiary (credited) side, if any.
    pub beneficiary: Option<ParticipantDraft>,
}

/// How the ledger writer must materialize the operation.
///
/// Modeled explicitly so the writer's branches are exhaustive: one record
/// with a single role, one record with both roles, or two linked records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationShape {
    /// Only the owner side is present.
    OwnerOnly,
    /// Only the beneficiary side is present.
    BeneficiaryOnly,
    /// Both sides present, same currency: a single record carries both
    /// roles under the owner-supplied identifier.
    SharedSameCurrency,
    /// Both sides present, different currencies: two records exist, each
    /// referencing the other via `operation_ref`.
    PairedCrossCurrency,
}

impl OperationShape {
    /// Derives the shape from the validated sides.
    ///
    /// At least one side must be present; resolution guarantees that before
    /// shaping happens.
    #[must_use]
    pub fn of(owner: Option<&ParticipantInput>, beneficiary: Option<&ParticipantInput>) -> Self {
        match (owner, beneficiary) {
            (Some(o), Some(b)) if o.currency == b.currency => Self::SharedSameCurrency,
            (Some(_), Some(_)) => Self::PairedCrossCurrency,
            (Some(_), None) => Self::OwnerOnly,
            (None, _) => Self::BeneficiaryOnly,
        }
    }

    /// Number of ledger records this shape produces.
    #[must_use]
    pub fn record_count(self) -> usize {
        match self {
            Self::PairedCrossCurrency => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn participant(currency: &str) -> ParticipantInput {
        ParticipantInput {
            operation_id: Uuid::new_v4(),
            wallet_id: Uuid::new_v4(),
            currency: currency.to_string(),
            raw_value: dec!(100),
            fee: dec!(2),
            description: "test".to_string(),
            allow_available_raw_value: false,
        }
    }

    #[test]
    fn test_owner_value_includes_fee() {
        assert_eq!(Side::Owner.signed_value(dec!(100), dec!(2)), dec!(102));
    }

    #[test]
    fn test_beneficiary_value_deducts_fee() {
        assert_eq!(Side::Beneficiary.signed_value(dec!(100), dec!(2)), dec!(98));
    }

    #[test]
    fn test_participants_required_sides() {
        assert!(Participants::Owner.requires_owner());
        assert!(!Participants::Owner.requires_beneficiary());
        assert!(!Participants::Beneficiary.requires_owner());
        assert!(Participants::Beneficiary.requires_beneficiary());
        assert!(Participants::Both.requires_owner());
        assert!(Participants::Both.requires_beneficiary());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OperationState::Pending.is_terminal());
        assert!(OperationState::Accepted.is_terminal());
        assert!(OperationState::Declined.is_terminal());
        assert!(OperationState::Reverted.is_terminal());
        assert!(OperationState::Undone.is_terminal());
    }

    #[test]
    fn test_usage_accumulation_excludes_failed_states() {
        assert!(OperationState::Pending.counts_toward_usage());
        assert!(OperationState::Accepted.counts_toward_usage());
        assert!(!OperationState::Declined.counts_toward_usage());
        assert!(!OperationState::Reverted.counts_toward_usage());
        assert!(!OperationState::Undone.counts_toward_usage());
    }

    #[test]
    fn test_shape_owner_only() {
        let owner = participant("BRL");
        assert_eq!(
            OperationShape::of(Some(&owner), None),
            OperationShape::OwnerOnly
        );
    }

    #[test]
    fn test_shape_beneficiary_only() {
        let beneficiary = participant("BRL");
        assert_eq!(
            OperationShape::of(None, Some(&beneficiary)),
            OperationShape::BeneficiaryOnly
        );
    }

    #[test]
    fn test_shape_shared_same_currency() {
        let owner = participant("BRL");
        let beneficiary = participant("BRL");
        let shape = OperationShape::of(Some(&owner), Some(&beneficiary));
        assert_eq!(shape, OperationShape::SharedSameCurrency);
        assert_eq!(shape.record_count(), 1);
    }

    #[test]
    fn test_shape_paired_cross_currency() {
        let owner = participant("BRL");
        let beneficiary = participant("USD");
        let shape = OperationShape::of(Some(&owner), Some(&beneficiary));
        assert_eq!(shape, OperationShape::PairedCrossCurrency);
        assert_eq!(shape.record_count(), 2);
    }
}
