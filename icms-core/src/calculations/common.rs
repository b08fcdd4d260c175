//! Common utility functions for ICMS and pricing calculations.
//!
//! This module provides shared functionality used across the calculators,
//! including currency rounding and percent-unit conversion.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Arguments
///
/// * `value` - The decimal value to round
///
/// # Returns
///
/// The value rounded to two decimal places.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use icms_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(1073.1707)), dec!(1073.17));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a value in percent units into a fraction (`18` becomes `0.18`).
///
/// The result is not rounded; rates keep their full precision until they are
/// applied to a monetary amount.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use icms_core::calculations::common::fraction;
///
/// assert_eq!(fraction(dec!(18)), dec!(0.18));
/// assert_eq!(fraction(dec!(17.5)), dec!(0.175));
/// ```
pub fn fraction(percent: Decimal) -> Decimal {
    percent / Decimal::ONE_HUNDRED
}

/// Applies a percentage to an amount and rounds the product to cents.
///
/// Returns `None` when the product does not fit in a [`Decimal`].
pub fn percent_of(
    amount: Decimal,
    percent: Decimal,
) -> Option<Decimal> {
    amount.checked_mul(fraction(percent)).map(round_half_up)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46)); // Away from zero
    }

    #[test]
    fn round_half_up_preserves_already_rounded_values() {
        let result = round_half_up(dec!(123.45));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_handles_repeating_quotient() {
        let result = round_half_up(dec!(880) / dec!(0.82));

        assert_eq!(result, dec!(1073.17));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        let result = round_half_up(dec!(999999.999));

        assert_eq!(result, dec!(1000000.00));
    }

    // =========================================================================
    // fraction / percent_of tests
    // =========================================================================

    #[test]
    fn fraction_divides_by_one_hundred() {
        assert_eq!(fraction(dec!(12)), dec!(0.12));
        assert_eq!(fraction(dec!(20.5)), dec!(0.205));
        assert_eq!(fraction(dec!(0)), dec!(0));
    }

    #[test]
    fn percent_of_rounds_product_to_cents() {
        // 1073.17 × 18% = 193.1706
        assert_eq!(percent_of(dec!(1073.17), dec!(18)), Some(dec!(193.17)));
    }

    #[test]
    fn percent_of_rounds_midpoint_away_from_zero() {
        // 0.25 × 10% = 0.025
        assert_eq!(percent_of(dec!(0.25), dec!(10)), Some(dec!(0.03)));
    }

    #[test]
    fn percent_of_reports_overflow() {
        assert_eq!(percent_of(Decimal::MAX, dec!(200)), None);
    }
}
