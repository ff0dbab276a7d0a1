// src/utils/precision.rs
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a price to whole cents, ties away from zero.
/// Example: 99.7464 -> 99.75, -0.2535 -> -0.25
///
/// The result is the nearest double to the exact cent amount, so two
/// independent computations of the same cent value compare equal.
pub fn round_cents(value: f64) -> f64 {
    round_dp(value, 2)
}

pub fn round_dp(value: f64, dp: u32) -> f64 {
    let Some(decimal) = Decimal::from_f64(value) else {
        // NaN / infinities: nothing sensible to round
        return value;
    };
    let mut rounded = decimal.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    // integer mantissa / 10^dp is a single correctly-rounded division
    let scale = 10_f64.powi(dp as i32);
    match rounded.mantissa().to_f64() {
        Some(m) => m / scale,
        None => value,
    }
}
