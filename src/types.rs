// src/types.rs
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::core::simulation::DashboardView;

/// Number of closing prices kept per instrument.
pub const HISTORY_LEN: usize = 30;

/// Static description of a tracked equity. One row of the instrument table.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentMeta {
    pub ticker: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
    pub base_price: f64,
    pub market_cap: f64,
    pub pe: f64,
    pub eps: f64,
    pub dividend_yield: f64,
    pub beta: f64,
    pub high_52w: f64,
    pub low_52w: f64,
    /// Hex display colour, e.g. `#f59e0b`.
    pub color: &'static str,
    pub shares: u32,
    /// Seed of the "today" snapshot stream.
    pub snapshot_seed: u32,
    /// Seed of the 30-day history stream. Distinct from `snapshot_seed`.
    pub history_seed: u32,
}

/// Live, mutable price state of one instrument.
///
/// `history` is oldest first and its last element always equals `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentState {
    pub price: f64,
    pub change: f64,
    /// Percent change against the session open.
    pub pct_change: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
    pub history: Vec<f64>,
}

impl InstrumentState {
    /// Cost basis reference: the oldest price in the window.
    pub fn basis(&self) -> f64 {
        self.history.first().copied().unwrap_or(self.price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Entry,
    Sell,
    Hold,
}

impl NotificationKind {
    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::Entry => "ENTRY SIGNAL",
            NotificationKind::Sell => "SELL ALERT",
            NotificationKind::Hold => "HOLD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub ticker: String,
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub read: bool,
}

/// User intents sent from the dashboard to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Activate(String),
    DismissToast(u64),
    ClearLog,
    MarkAllRead,
    Reset,
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    Snapshot(Box<DashboardView>),
    Log(String),
}
