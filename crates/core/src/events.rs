//! Outbound notifications for created operations.
//!
//! The core does not own any messaging infrastructure; it calls the
//! injected emitter once per created record after the transaction commits.
//! External subsystems (settlement netting, limit-change consumers) attach
//! their own implementations.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Payload announcing a newly created pending operation.
#[derive(Debug, Clone)]
pub struct PendingOperationEvent {
    /// Identifier of the created operation record.
    pub operation_id: Uuid,
    /// Tag of the governing transaction type.
    pub transaction_type: String,
    /// Currency symbol of the record.
    pub currency: String,
    /// Signed value of the record.
    pub value: Decimal,
}

/// Payload announcing consumed user-limit allowance.
#[derive(Debug, Clone)]
pub struct UserLimitEvent {
    /// User whose allowance was consumed.
    pub user_id: Uuid,
    /// Tag of the limit type.
    pub limit_type: String,
    /// Value consumed by the committing operation.
    pub consumed: Decimal,
    /// Daily usage after the operation committed.
    pub used_daily: Decimal,
}

/// Emitter for operation lifecycle notifications.
#[async_trait]
pub trait OperationEvents: Send + Sync {
    /// A pending operation record was created. Emitted once per record
    /// (twice for a cross-currency pair).
    async fn pending_operation_created(&self, event: &PendingOperationEvent);

    /// A limit-checked operation consumed user allowance.
    async fn user_limit_consumed(&self, event: &UserLimitEvent);
}

/// Emitter that only writes structured logs.
///
/// The default wiring for environments without downstream consumers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

#[async_trait]
impl OperationEvents for TracingEvents {
    async fn pending_operation_created(&self, event: &PendingOperationEvent) {
        tracing::info!(
            operation_id = %event.operation_id,
            transaction_type = %event.transaction_type,
            currency = %event.currency,
            value = %event.value,
            "pending operation created"
        );
    }

    async fn user_limit_consumed(&self, event: &UserLimitEvent) {
        tracing::info!(
            user_id = %event.user_id,
            limit_type = %event.limit_type,
            consumed = %event.consumed,
            used_daily = %event.used_daily,
            "user limit consumed"
        );
    }
}
