//! Decimal helpers shared by the pricing and costing engines.
//!
//! All currency amounts are `rust_decimal::Decimal` and every value that gets
//! persisted is quantized to two fractional digits with half-away-from-zero
//! rounding, matching how the ledger stores euro amounts.

use rust_decimal::{Decimal, RoundingStrategy};

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
const SIXTY: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Quantize a currency amount to cents, rounding half away from zero.
pub fn to_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `value * pct / 100` for percentage parameters expressed as parts per
/// hundred (`20.0` means 20%).
pub fn apply_pct(value: Decimal, pct: Decimal) -> Decimal {
    value * pct / HUNDRED
}

/// Convert a duration in minutes to fractional hours.
pub fn minutes_to_hours(minutes: Decimal) -> Decimal {
    minutes / SIXTY
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{apply_pct, minutes_to_hours, to_currency};

    #[test]
    fn quantizes_half_away_from_zero() {
        assert_eq!(to_currency(Decimal::new(2058, 3)), Decimal::new(206, 2)); // 2.058 -> 2.06
        assert_eq!(to_currency(Decimal::new(6245, 3)), Decimal::new(625, 2)); // 6.245 -> 6.25
        assert_eq!(to_currency(Decimal::new(-1235, 3)), Decimal::new(-124, 2)); // -1.235 -> -1.24
    }

    #[test]
    fn percentages_are_parts_per_hundred() {
        assert_eq!(apply_pct(Decimal::new(2058, 2), Decimal::new(10, 0)), Decimal::new(2058, 3));
    }

    #[test]
    fn converts_minutes_to_hours() {
        assert_eq!(minutes_to_hours(Decimal::from(90)), Decimal::new(15, 1));
    }
}
