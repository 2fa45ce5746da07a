//! Available-value capping.
//!
//! When the owner flags a request with "allow available raw value", a debit
//! the account cannot fully cover is degraded to what the balance allows
//! instead of failing. The fee is served first, the principal absorbs the
//! shortfall, and the original request is preserved for audit.

use rust_decimal::Decimal;

/// Result of applying available-value capping to an owner request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapOutcome {
    /// The balance covers the full request; nothing changes.
    Unchanged,
    /// The request was reduced to fit the balance.
    Capped {
        /// Reduced principal, used for all downstream computation.
        raw_value: Decimal,
        /// Reduced fee.
        fee: Decimal,
        /// Originally requested principal, kept for audit.
        requested_raw_value: Decimal,
        /// Originally requested fee, kept for audit.
        requested_fee: Decimal,
    },
}

/// Caps `raw_value + fee` to the account balance.
///
/// `capped_fee = min(fee, balance)`,
/// `capped_raw_value = max(balance - capped_fee, 0)`.
///
/// Only the owner side is ever capped; the beneficiary side is not touched
/// by this path.
#[must_use]
pub fn cap_to_balance(raw_value: Decimal, fee: Decimal, balance: Decimal) -> CapOutcome {
    let want = raw_value + fee;
    if want <= balance {
        return CapOutcome::Unchanged;
    }

    let capped_fee = fee.min(balance);
    let capped_raw_value = (balance - capped_fee).max(Decimal::ZERO);

    CapOutcome::Capped {
        raw_value: capped_raw_value,
        fee: capped_fee,
        requested_raw_value: raw_value,
        requested_fee: fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sufficient_balance_is_unchanged() {
        assert_eq!(
            cap_to_balance(dec!(100), dec!(5), dec!(105)),
            CapOutcome::Unchanged
        );
        assert_eq!(
            cap_to_balance(dec!(100), dec!(5), dec!(1000)),
            CapOutcome::Unchanged
        );
    }

    #[test]
    fn test_shortfall_reduces_raw_value_first() {
        let outcome = cap_to_balance(dec!(100), dec!(5), dec!(80));
        assert_eq!(
            outcome,
            CapOutcome::Capped {
                raw_value: dec!(75),
                fee: dec!(5),
                requested_raw_value: dec!(100),
                requested_fee: dec!(5),
            }
        );
    }

    #[test]
    fn test_balance_below_fee_caps_fee_too() {
        let outcome = cap_to_balance(dec!(100), dec!(5), dec!(3));
        assert_eq!(
            outcome,
            CapOutcome::Capped {
                raw_value: dec!(0),
                fee: dec!(3),
                requested_raw_value: dec!(100),
                requested_fee: dec!(5),
            }
        );
    }

    #[test]
    fn test_zero_balance_caps_everything_to_zero() {
        let outcome = cap_to_balance(dec!(100), dec!(5), dec!(0));
        assert_eq!(
            outcome,
            CapOutcome::Capped {
                raw_value: dec!(0),
                fee: dec!(0),
                requested_raw_value: dec!(100),
                requested_fee: dec!(5),
            }
        );
    }

    fn amount() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000_00i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// A capped request always fits the balance exactly or below, and
        /// never goes negative.
        #[test]
        fn prop_capped_request_fits_balance(
            raw in amount(),
            fee in amount(),
            balance in amount(),
        ) {
            match cap_to_balance(raw, fee, balance) {
                CapOutcome::Unchanged => {
                    prop_assert!(raw + fee <= balance);
                }
                CapOutcome::Capped { raw_value, fee: capped_fee, .. } => {
                    prop_assert!(raw + fee > balance);
                    prop_assert!(raw_value >= Decimal::ZERO);
                    prop_assert!(capped_fee >= Decimal::ZERO);
                    prop_assert!(raw_value + capped_fee <= balance);
                }
            }
        }

        /// The fee is served before the principal: it is only reduced when
        /// the balance cannot cover it alone.
        #[test]
        fn prop_fee_reduced_only_when_balance_below_fee(
            raw in amount(),
            fee in amount(),
            balance in amount(),
        ) {
            if let CapOutcome::Capped { fee: capped_fee, .. } =
                cap_to_balance(raw, fee, balance)
            {
                prop_assert_eq!(capped_fee, fee.min(balance));
            }
        }

        /// The original request is preserved verbatim for audit.
        #[test]
        fn prop_requested_amounts_preserved(
            raw in amount(),
            fee in amount(),
            balance in amount(),
        ) {
            if let CapOutcome::Capped { requested_raw_value, requested_fee, .. } =
                cap_to_balance(raw, fee, balance)
            {
                prop_assert_eq!(requested_raw_value, raw);
                prop_assert_eq!(requested_fee, fee);
            }
        }
    }
}
