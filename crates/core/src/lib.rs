//! Core business logic for Monetra.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations for
//! the operation-creation path live here.
//!
//! # Modules
//!
//! - `operation` - participant/transaction-type resolution, capping, shaping
//! - `limits` - spending-limit policy: thresholds, night windows, trackers
//! - `credit` - cross-currency credit-balance liability valuation
//! - `quotes` - streamed-quotation source abstraction
//! - `events` - outbound notifications for created operations

pub mod credit;
pub mod events;
pub mod limits;
pub mod operation;
pub mod quotes;

pub use operation::error::OperationError;
