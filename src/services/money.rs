use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Balances smaller than this are considered settled
pub const SETTLEMENT_EPSILON: Decimal = dec!(0.01);

/// Rounds to whole cents for presentation. Negative zero is normalised.
pub fn round_currency(value: Decimal) -> Decimal {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

pub fn is_settled(value: Decimal) -> bool {
    value.abs() < SETTLEMENT_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_currency_midpoint_goes_away_from_zero() {
        assert_eq!(round_currency(dec!(2.345)), dec!(2.35));
        assert_eq!(round_currency(dec!(-2.345)), dec!(-2.35));
    }

    #[test]
    fn test_round_currency_normalises_negative_zero() {
        let rounded = round_currency(dec!(-0.004));
        assert!(rounded.is_zero());
        assert!(!rounded.is_sign_negative());
    }

    #[test]
    fn test_is_settled_uses_strict_bound() {
        assert!(is_settled(dec!(0.009)));
        assert!(!is_settled(dec!(0.01)));
        assert!(!is_settled(dec!(-0.01)));
    }
}
