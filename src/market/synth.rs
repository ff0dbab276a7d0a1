// src/market/synth.rs
use crate::market::rng::Lcg;
use crate::types::{InstrumentMeta, InstrumentState, HISTORY_LEN};
use crate::utils::precision::round_cents;

/// Synthesized prices never go below this.
pub const MIN_PRICE: f64 = 1.0;

/// Builds the opening state of one instrument from its two seeds.
pub fn synthesize(meta: &InstrumentMeta) -> InstrumentState {
    synthesize_from(meta.base_price, meta.snapshot_seed, meta.history_seed)
}

pub fn synthesize_from(base: f64, snapshot_seed: u32, history_seed: u32) -> InstrumentState {
    let mut rng = Lcg::new(snapshot_seed);

    let drift = (rng.next_unit() - 0.49) * base * 0.01;
    let price = round_cents(base + drift);
    let change = round_cents(drift);
    let pct_change = round_cents(drift / base * 100.0);
    let open = round_cents(base + (rng.next_unit() - 0.5) * base * 0.006);
    let high = round_cents(price * (1.0 + rng.next_unit() * 0.012));
    let low = round_cents(price * (1.0 - rng.next_unit() * 0.012));
    let volume = (rng.next_unit() * 40_000_000.0 + 5_000_000.0).floor() as u64;

    InstrumentState {
        price,
        change,
        pct_change,
        open,
        high,
        low,
        volume,
        history: build_history(price, history_seed),
    }
}

/// 30 closing prices ending exactly at `current_price`.
///
/// The path starts up to 12% below the current price and walks forward
/// with small multiplicative shocks, slightly biased upward.
pub fn build_history(current_price: f64, seed: u32) -> Vec<f64> {
    let mut rng = Lcg::new(seed);
    let mut p = current_price * (1.0 - rng.next_unit() * 0.12);

    let mut history = Vec::with_capacity(HISTORY_LEN);
    for _ in 0..HISTORY_LEN {
        p = (p * (1.0 + (rng.next_unit() - 0.485) * 0.025)).max(MIN_PRICE);
        history.push(round_cents(p));
    }
    if let Some(last) = history.last_mut() {
        *last = current_price;
    }
    history
}
