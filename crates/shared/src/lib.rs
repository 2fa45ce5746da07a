//! Shared configuration and error types for Monetra.
//!
//! The operation-creation core is invoked in-process by an upstream request
//! handler; this crate holds the pieces both sides agree on: configuration
//! loading and the application-level error surface.

pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
