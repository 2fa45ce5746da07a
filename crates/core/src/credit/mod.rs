//! Cross-currency credit-balance valuation.

pub mod valuator;

pub use valuator::{check_credit_balance, liability, CurrencyPosition};
