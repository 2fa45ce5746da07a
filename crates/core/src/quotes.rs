//! Streamed-quotation source abstraction.
//!
//! Market quotations are computed by an external streaming subsystem; this
//! core only consumes the latest rate for a currency pair. Implementations
//! are injected into the ledger writer.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Read access to the latest streamed quotation per currency pair.
#[async_trait]
pub trait QuotationSource: Send + Sync {
    /// Latest rate converting one unit of `from` into `to`, if a streamed
    /// quotation exists for the pair.
    async fn rate(&self, from: &str, to: &str) -> Option<Decimal>;
}

/// A fixed in-memory quotation table.
///
/// Used by tests and local tooling; production wires the streaming
/// consumer instead.
#[derive(Debug, Clone, Default)]
pub struct FixedQuotations {
    rates: HashMap<(String, String), Decimal>,
}

impl FixedQuotations {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rate for the pair.
    #[must_use]
    pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        self.rates.insert((from.to_string(), to.to_string()), rate);
        self
    }
}

#[async_trait]
impl QuotationSource for FixedQuotations {
    async fn rate(&self, from: &str, to: &str) -> Option<Decimal> {
        self.rates
            .get(&(from.to_string(), to.to_string()))
            .copied()
    }
}
