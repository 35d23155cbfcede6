use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
