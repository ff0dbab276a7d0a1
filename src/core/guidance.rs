// src/core/guidance.rs
use crate::connectors::assessment::{Assessment, EntryPoint, SellSentiment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderLevel {
    ProfitTarget,
    SellTrigger,
    Current,
    StopLoss,
}

impl LadderLevel {
    pub fn label(&self) -> &'static str {
        match self {
            LadderLevel::ProfitTarget => "Profit Target",
            LadderLevel::SellTrigger => "Sell Trigger",
            LadderLevel::Current => "Current Price",
            LadderLevel::StopLoss => "Stop-Loss",
        }
    }
}

/// Entry/hold/sell view of one instrument at its current price.
#[derive(Debug, Clone, PartialEq)]
pub struct Guidance {
    pub in_entry_zone: bool,
    pub entry_gauge_pct: f64,
    pub sell_ladder: Vec<(LadderLevel, f64)>,
}

impl Guidance {
    pub fn new(price: f64, assessment: &Assessment) -> Self {
        Self {
            in_entry_zone: assessment.entry_point.contains(price),
            entry_gauge_pct: entry_gauge(price, &assessment.entry_point),
            sell_ladder: sell_ladder(price, &assessment.sell_sentiment),
        }
    }
}

/// Marker position (percent) on a gauge four zone-widths wide whose left
/// edge sits one zone-width below the entry zone. Clamped to [3, 97].
pub fn entry_gauge(price: f64, ep: &EntryPoint) -> f64 {
    let span = (ep.entry_high - ep.entry_low) * 4.0;
    if span <= 0.0 {
        return if price < ep.entry_low {
            3.0
        } else if price > ep.entry_high {
            97.0
        } else {
            50.0
        };
    }
    let start = ep.entry_low - span * 0.25;
    ((price - start) / span * 100.0).clamp(3.0, 97.0)
}

/// Exit levels plus the live price, highest first. Absent or zero levels
/// are left out.
pub fn sell_ladder(price: f64, ss: &SellSentiment) -> Vec<(LadderLevel, f64)> {
    let mut ladder: Vec<(LadderLevel, f64)> = [
        (LadderLevel::ProfitTarget, Some(ss.profit_target)),
        (LadderLevel::SellTrigger, ss.sell_trigger_price),
        (LadderLevel::Current, Some(price)),
        (LadderLevel::StopLoss, Some(ss.stop_loss)),
    ]
    .into_iter()
    .filter_map(|(level, p)| p.filter(|&v| v != 0.0).map(|v| (level, v)))
    .collect();

    ladder.sort_by(|a, b| b.1.total_cmp(&a.1));
    ladder
}
