//! Operation creation domain logic.
//!
//! An operation is a single ledger entry recording a value movement between
//! an owner (debited) and/or a beneficiary (credited), possibly linked to a
//! paired entry in another currency.

pub mod capping;
pub mod error;
pub mod resolve;
pub mod types;

pub use capping::{cap_to_balance, CapOutcome};
pub use error::OperationError;
pub use types::{
    CreateOperationDraft, OperationShape, OperationState, ParticipantDraft, ParticipantInput,
    Participants, Side,
};
