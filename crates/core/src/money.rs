//! Money rounding for invoice amounts.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a monetary amount to 2 decimal places, half-up.
///
/// Midpoints round away from zero: `2.345` becomes `2.35`, `-2.345` becomes
/// `-2.35`. Line amounts and line VAT are rounded exactly once with this
/// function; invoice totals are sums of already-rounded components and are
/// never re-rounded.
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn rounds_half_up_at_the_midpoint() {
        assert_eq!(round2(d("2.345")), d("2.35"));
        assert_eq!(round2(d("2.344")), d("2.34"));
        // A bankers'-rounding implementation would give 2.12 here.
        assert_eq!(round2(d("2.125")), d("2.13"));
        assert_eq!(round2(d("1.005")), d("1.01"));
    }

    #[test]
    fn midpoints_round_away_from_zero_for_negatives() {
        assert_eq!(round2(d("-2.345")), d("-2.35"));
        assert_eq!(round2(d("-2.344")), d("-2.34"));
    }

    #[test]
    fn already_rounded_values_are_unchanged() {
        assert_eq!(round2(d("100.00")), d("100.00"));
        assert_eq!(round2(d("0.1")), d("0.1"));
        assert_eq!(round2(Decimal::ZERO), Decimal::ZERO);
    }
}
