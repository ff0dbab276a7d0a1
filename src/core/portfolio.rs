// src/core/portfolio.rs
//! Portfolio-level figures derived on every read from the live instrument
//! state. Instruments without state contribute nothing; they are never an
//! error.

use std::collections::HashMap;

use crate::types::{InstrumentMeta, InstrumentState, HISTORY_LEN};
use crate::utils::precision::round_cents;

/// Day offsets shown in the P&L table, relative to today.
pub const PNL_TABLE_OFFSETS: [i32; 7] = [-29, -21, -14, -7, -3, -1, 0];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PortfolioSnapshot {
    pub value: f64,
    pub cost: f64,
    pub pnl: f64,
    pub return_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionPnl {
    pub ticker: &'static str,
    pub shares: u32,
    pub entry: f64,
    pub current: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
}

fn pct_of(amount: f64, basis: f64) -> f64 {
    if basis == 0.0 {
        0.0
    } else {
        amount / basis * 100.0
    }
}

pub fn aggregate(
    universe: &[InstrumentMeta],
    states: &HashMap<String, InstrumentState>,
) -> PortfolioSnapshot {
    let (value, cost) = universe
        .iter()
        .filter_map(|m| states.get(m.ticker).map(|s| (m, s)))
        .fold((0.0, 0.0), |(value, cost), (m, s)| {
            let shares = f64::from(m.shares);
            (value + s.price * shares, cost + s.basis() * shares)
        });

    let pnl = value - cost;
    PortfolioSnapshot {
        value,
        cost,
        pnl,
        return_pct: pct_of(pnl, cost),
    }
}

pub fn position_pnl(meta: &InstrumentMeta, state: &InstrumentState) -> PositionPnl {
    let entry = state.basis();
    let delta = state.price - entry;
    PositionPnl {
        ticker: meta.ticker,
        shares: meta.shares,
        entry,
        current: state.price,
        pnl: delta * f64::from(meta.shares),
        pnl_pct: pct_of(delta, entry),
    }
}

/// Unrealised P&L of one position as of history index `day`.
fn pnl_on_day(meta: &InstrumentMeta, state: &InstrumentState, day: usize) -> f64 {
    let Some(&price) = state.history.get(day.min(state.history.len().saturating_sub(1))) else {
        return 0.0;
    };
    (price - state.basis()) * f64::from(meta.shares)
}

/// Total portfolio P&L for each of the 30 days in the window, oldest first.
pub fn pnl_series(
    universe: &[InstrumentMeta],
    states: &HashMap<String, InstrumentState>,
) -> Vec<f64> {
    (0..HISTORY_LEN)
        .map(|day| {
            let total: f64 = universe
                .iter()
                .filter_map(|m| states.get(m.ticker).map(|s| pnl_on_day(m, s, day)))
                .sum();
            round_cents(total)
        })
        .collect()
}

fn offset_index(offset: i32) -> usize {
    (HISTORY_LEN as i32 - 1 + offset).max(0) as usize
}

/// One row per held instrument: P&L at each of [`PNL_TABLE_OFFSETS`].
pub fn pnl_table(
    universe: &[InstrumentMeta],
    states: &HashMap<String, InstrumentState>,
) -> Vec<(&'static str, Vec<f64>)> {
    universe
        .iter()
        .filter_map(|m| {
            states.get(m.ticker).map(|s| {
                let row = PNL_TABLE_OFFSETS
                    .iter()
                    .map(|&d| pnl_on_day(m, s, offset_index(d)))
                    .collect();
                (m.ticker, row)
            })
        })
        .collect()
}

/// Per-column sums of a [`pnl_table`]: the portfolio total row.
pub fn pnl_table_totals(table: &[(&'static str, Vec<f64>)]) -> Vec<f64> {
    let mut totals = vec![0.0; PNL_TABLE_OFFSETS.len()];
    for (_, row) in table {
        for (total, v) in totals.iter_mut().zip(row) {
            *total += v;
        }
    }
    totals.into_iter().map(round_cents).collect()
}
