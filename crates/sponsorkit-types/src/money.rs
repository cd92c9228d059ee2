//! Money helpers
//!
//! Deal amounts are decimal dollars. The payment processor speaks integer
//! minor units (cents), so conversions in both directions live here and
//! are checked rather than truncating.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::{PlatformError, Result};

/// Round a dollar amount to two decimal places, half-up.
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a dollar amount to processor minor units (cents).
///
/// Fails with `InvalidArgument` for negative amounts or amounts that do
/// not fit in an `i64` after scaling.
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    if amount.is_sign_negative() {
        return Err(PlatformError::invalid_argument(
            "amount",
            "must not be negative",
        ));
    }
    let cents = round2(amount) * dec!(100);
    cents.to_i64().ok_or_else(|| {
        PlatformError::invalid_argument("amount", "does not fit in processor minor units")
    })
}

/// Convert processor minor units (cents) back to a dollar amount.
pub fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(dec!(900.005)), dec!(900.01));
        assert_eq!(round2(dec!(900.004)), dec!(900.00));
        assert_eq!(round2(dec!(125)), dec!(125));
    }

    #[test]
    fn test_minor_unit_roundtrip() {
        assert_eq!(to_minor_units(dec!(5000)).unwrap(), 500_000);
        assert_eq!(to_minor_units(dec!(12.34)).unwrap(), 1234);
        assert_eq!(from_minor_units(1234), dec!(12.34));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = to_minor_units(dec!(-1)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }
}
