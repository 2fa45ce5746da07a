//! Credit-balance liability computation.
//!
//! Some transaction types let a user spend against a cross-currency credit
//! line when their account balance falls short. The user's true liability
//! is the sum of their negative foreign-currency positions converted to the
//! limit type's home currency, including holds that have not been posted to
//! balance yet.

use rust_decimal::Decimal;

use crate::operation::error::OperationError;

/// One wallet-account position contributing to liability.
#[derive(Debug, Clone)]
pub struct CurrencyPosition {
    /// Currency symbol of the account.
    pub currency: String,
    /// Account balance (negative balances create liability).
    pub balance: Decimal,
    /// Sum of not-yet-posted pending transaction values against the
    /// account, signed (debits negative).
    pub pending: Decimal,
}

impl CurrencyPosition {
    /// Net exposure of this position: balance plus unposted holds.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.balance + self.pending
    }
}

/// Computes the user's liability in the home currency.
///
/// Each position with a negative net exposure contributes its magnitude
/// converted via the streamed quotation for (currency → home); home
/// currency positions convert at 1. Positive positions do not offset
/// liability.
///
/// # Errors
///
/// Returns a quotation-not-found error when a required pair has no
/// streamed quotation.
pub fn liability<F>(
    home_currency: &str,
    positions: &[CurrencyPosition],
    quote: F,
) -> Result<Decimal, OperationError>
where
    F: Fn(&str, &str) -> Option<Decimal>,
{
    let mut total = Decimal::ZERO;

    for position in positions {
        let net = position.net();
        if net >= Decimal::ZERO {
            continue;
        }

        let rate = if position.currency == home_currency {
            Decimal::ONE
        } else {
            quote(&position.currency, home_currency).ok_or_else(|| {
                OperationError::QuotationNotFound {
                    from: position.currency.clone(),
                    to: home_currency.to_string(),
                }
            })?
        };

        total += -net * rate;
    }

    Ok(total)
}

/// Validates computed liability against the user's credit allowance.
///
/// # Errors
///
/// Returns insufficient-funds when liability exceeds the credit balance.
pub fn check_credit_balance(
    liability: Decimal,
    credit_balance: Decimal,
) -> Result<(), OperationError> {
    if liability > credit_balance {
        return Err(OperationError::InsufficientFunds {
            required: liability,
            available: credit_balance,
        });
    }
    Ok(())
}
