//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. The operation repository owns the transactional create
//! path; the reference and limits modules are its lookup helpers.

pub mod limits;
pub mod operation;
pub mod reference;

pub use operation::{CreatedOperation, OperationRepository};

use monetra_core::OperationError;
use monetra_shared::error::AppError;
use sea_orm::DbErr;

/// Error type for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A domain rule rejected the operation; nothing was written.
    #[error(transparent)]
    Domain(#[from] OperationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Domain(domain) => match &domain {
                OperationError::MissingTransactionTypeTag
                | OperationError::MissingParticipant(_)
                | OperationError::MissingField { .. }
                | OperationError::NegativeAmount { .. } => Self::Validation(domain.to_string()),
                OperationError::TransactionTypeNotFound(_)
                | OperationError::CurrencyNotFound(_)
                | OperationError::WalletNotFound(_)
                | OperationError::WalletAccountNotFound { .. } => {
                    Self::NotFound(domain.to_string())
                }
                OperationError::QuotationNotFound { .. } => {
                    Self::ExternalService(domain.to_string())
                }
                OperationError::UnknownTransactionTypeState { .. }
                | OperationError::LimitConfigurationMissing(_)
                | OperationError::InvalidLimitConfiguration { .. }
                | OperationError::InvalidMasterData { .. } => {
                    Self::Configuration(domain.to_string())
                }
                _ => Self::BusinessRule(domain.to_string()),
            },
            RepositoryError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_categories() {
        let err: AppError =
            RepositoryError::Domain(OperationError::MissingTransactionTypeTag).into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err: AppError = RepositoryError::Domain(OperationError::TransactionTypeNotFound(
            "CASH_OUT".to_string(),
        ))
        .into();
        assert_eq!(err.error_code(), "NOT_FOUND");

        let err: AppError = RepositoryError::Domain(OperationError::LimitConfigurationMissing(
            "CASH_OUT".to_string(),
        ))
        .into();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");

        let err: AppError = RepositoryError::Domain(OperationError::TransactionTypeNotActive(
            "CASH_OUT".to_string(),
        ))
        .into();
        assert_eq!(err.error_code(), "BUSINESS_RULE_VIOLATION");
    }
}
