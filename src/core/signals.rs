// src/core/signals.rs
//! Threshold crossings against an active assessment.
//!
//! All price rules are edge-triggered: a rule fires on the tick that moves
//! the price *into* its condition and stays silent while the condition
//! keeps holding. Rules are checked in a fixed order (entry zone,
//! stop-loss, profit target) and are independent of each other.

use std::sync::Arc;

use crate::connectors::assessment::{Assessment, Urgency};
use crate::types::NotificationKind;
use crate::utils::format::dollars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    EnteredZone,
    StopLoss,
    ProfitTarget,
    ActivationUrgency,
    ActivationSellSignal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    pub trigger: Trigger,
    pub kind: NotificationKind,
    pub message: String,
}

impl SignalEvent {
    fn new(trigger: Trigger, kind: NotificationKind, message: String) -> Self {
        Self {
            trigger,
            kind,
            message,
        }
    }
}

/// Compares one price transition against the assessment's thresholds.
pub fn evaluate(ticker: &str, prev: f64, new: f64, assessment: &Assessment) -> Vec<SignalEvent> {
    let mut events = Vec::new();
    let ep = &assessment.entry_point;
    let ss = &assessment.sell_sentiment;

    if ep.contains(new) && !ep.contains(prev) {
        events.push(SignalEvent::new(
            Trigger::EnteredZone,
            NotificationKind::Entry,
            format!(
                "{} entered entry zone {}\u{2013}{}",
                ticker,
                dollars(ep.entry_low, 2),
                dollars(ep.entry_high, 2)
            ),
        ));
    }

    if new <= ss.stop_loss && prev > ss.stop_loss {
        events.push(SignalEvent::new(
            Trigger::StopLoss,
            NotificationKind::Sell,
            format!("{} breached stop-loss {}", ticker, dollars(ss.stop_loss, 2)),
        ));
    }

    if new >= ss.profit_target && prev < ss.profit_target {
        events.push(SignalEvent::new(
            Trigger::ProfitTarget,
            NotificationKind::Sell,
            format!("{} hit profit target {}", ticker, dollars(ss.profit_target, 2)),
        ));
    }

    events
}

/// One-off notifications raised when an assessment becomes active.
pub fn activation_signals(assessment: &Assessment) -> Vec<SignalEvent> {
    let mut events = Vec::new();
    let ep = &assessment.entry_point;
    let ss = &assessment.sell_sentiment;

    match ep.urgency {
        Urgency::Immediate => events.push(SignalEvent::new(
            Trigger::ActivationUrgency,
            NotificationKind::Entry,
            format!("IMMEDIATE entry at {}", dollars(ep.ideal_entry, 2)),
        )),
        Urgency::Patient => events.push(SignalEvent::new(
            Trigger::ActivationUrgency,
            NotificationKind::Hold,
            format!(
                "Patient zone {}\u{2013}{}",
                dollars(ep.entry_low, 2),
                dollars(ep.entry_high, 2)
            ),
        )),
        Urgency::Wait => {}
    }

    if ss.sell_signal.is_exit() {
        events.push(SignalEvent::new(
            Trigger::ActivationSellSignal,
            NotificationKind::Sell,
            format!(
                "{} \u{2014} target {}",
                ss.sell_signal,
                dollars(ss.profit_target, 2)
            ),
        ));
    }

    events
}

/// Per-instrument edge detector: the last price it saw and the assessment
/// it checks against. Updated in one step per tick.
#[derive(Debug, Clone)]
pub struct SignalTracker {
    last_observed: f64,
    assessment: Option<Arc<Assessment>>,
}

impl SignalTracker {
    pub fn new(price: f64) -> Self {
        Self {
            last_observed: price,
            assessment: None,
        }
    }

    /// Starts checking `assessment`, using `price` as the reference point so
    /// the first tick after activation only fires on a real crossing.
    pub fn arm(&mut self, assessment: Arc<Assessment>, price: f64) {
        self.assessment = Some(assessment);
        self.last_observed = price;
    }

    pub fn assessment(&self) -> Option<&Arc<Assessment>> {
        self.assessment.as_ref()
    }

    #[cfg(test)]
    fn last_observed(&self) -> f64 {
        self.last_observed
    }

    /// Feeds a new price; returns whatever fired and remembers the price.
    pub fn observe(&mut self, ticker: &str, price: f64) -> Vec<SignalEvent> {
        let events = match &self.assessment {
            Some(a) => evaluate(ticker, self.last_observed, price, a),
            None => Vec::new(),
        };
        self.last_observed = price;
        events
    }
}
