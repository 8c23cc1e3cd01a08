// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Currency rounding policy.
//!
//! All currency amounts round to 2 decimal places using round-half-up, and
//! rounding happens at the line-item level only. Invoice totals are summed
//! from already-rounded line items so that every total reconciles line by
//! line; the aggregate is never re-rounded.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a currency amount to 2 decimal places, half away from zero.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_half_up() {
        let amount: Decimal = Decimal::from_str("10.005").unwrap();
        assert_eq!(round_currency(amount), Decimal::from_str("10.01").unwrap());
    }

    #[test]
    fn test_round_half_down_boundary() {
        let amount: Decimal = Decimal::from_str("10.004").unwrap();
        assert_eq!(round_currency(amount), Decimal::from_str("10.00").unwrap());
    }

    #[test]
    fn test_round_preserves_two_places() {
        let amount: Decimal = Decimal::from_str("7.50").unwrap();
        assert_eq!(round_currency(amount), Decimal::from_str("7.50").unwrap());
    }

    #[test]
    fn test_round_negative_half_away_from_zero() {
        let amount: Decimal = Decimal::from_str("-2.345").unwrap();
        assert_eq!(round_currency(amount), Decimal::from_str("-2.35").unwrap());
    }
}
