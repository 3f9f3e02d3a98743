use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an edited price the way the sales desk quotes it: prices under one are
/// kept to the cent, everything else goes up to the next half unit.
pub fn round_price(value: Decimal) -> Decimal {
    if value < Decimal::ONE {
        return value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    }

    match value.checked_mul(Decimal::TWO) {
        Some(doubled) => doubled.ceil() / Decimal::TWO,
        // doubling only overflows past 2^95, where no fractional digits remain
        None => value,
    }
}

/// Money rounding for totals: two places, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::{round_money, round_price};

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).expect("decimal literal")
    }

    #[test]
    fn prices_from_one_round_up_to_next_half() {
        assert_eq!(round_price(dec("10.01")), dec("10.5"));
        assert_eq!(round_price(dec("10.50")), dec("10.50"));
        assert_eq!(round_price(dec("10.51")), dec("11"));
        assert_eq!(round_price(dec("1")), dec("1"));
    }

    #[test]
    fn prices_below_one_keep_cents() {
        assert_eq!(round_price(dec("0.004")), dec("0.00"));
        assert_eq!(round_price(dec("0.996")), dec("1.00"));
        assert_eq!(round_price(dec("0.125")), dec("0.13"));
    }

    #[test]
    fn largest_prices_round_without_overflow() {
        assert_eq!(round_price(Decimal::MAX), Decimal::MAX);
        let near_max = Decimal::MAX - Decimal::ONE;
        assert_eq!(round_price(near_max), near_max);
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(round_money(dec("74.935")), dec("74.94"));
        assert_eq!(round_money(dec("70")), dec("70"));
    }
}
