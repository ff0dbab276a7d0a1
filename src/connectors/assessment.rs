// src/connectors/assessment.rs
//! Typed form of the advisory service reply.
//!
//! The service answers with loosely formatted JSON (sometimes wrapped in a
//! markdown fence). [`parse_assessment`] is the only way to obtain an
//! [`Assessment`]: it strips fences, deserializes every field the signal
//! logic relies on, and rejects thresholds that would make the signals
//! meaningless.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AdvisoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "STRONG SELL")]
    StrongSell,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::StrongBuy => "STRONG BUY",
            Rating::Buy => "BUY",
            Rating::Hold => "HOLD",
            Rating::Sell => "SELL",
            Rating::StrongSell => "STRONG SELL",
        }
    }

    /// 5 bars for STRONG BUY down to 1 for STRONG SELL.
    pub fn strength(&self) -> u8 {
        match self {
            Rating::StrongBuy => 5,
            Rating::Buy => 4,
            Rating::Hold => 3,
            Rating::Sell => 2,
            Rating::StrongSell => 1,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Rating::StrongBuy => "\u{25B2}\u{25B2}",
            Rating::Buy => "\u{25B2}",
            Rating::Hold => "\u{25A0}",
            Rating::Sell => "\u{25BC}",
            Rating::StrongSell => "\u{25BC}\u{25BC}",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
    Immediate,
    Patient,
    Wait,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Immediate => "ENTER NOW",
            Urgency::Patient => "PATIENT ENTRY",
            Urgency::Wait => "WAIT FOR DIP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SellSignal {
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "TRIM")]
    Trim,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "URGENT SELL")]
    UrgentSell,
}

impl SellSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellSignal::Hold => "HOLD",
            SellSignal::Trim => "TRIM",
            SellSignal::Sell => "SELL",
            SellSignal::UrgentSell => "URGENT SELL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SellSignal::Hold => "HOLD POSITION",
            SellSignal::Trim => "TRIM POSITION",
            SellSignal::Sell => "CONSIDER SELLING",
            SellSignal::UrgentSell => "EXIT NOW",
        }
    }

    /// SELL and URGENT SELL raise a notification on activation.
    pub fn is_exit(&self) -> bool {
        matches!(self, SellSignal::Sell | SellSignal::UrgentSell)
    }
}

impl fmt::Display for SellSignal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    pub ideal_entry: f64,
    pub entry_low: f64,
    pub entry_high: f64,
    #[serde(default)]
    pub entry_rationale: String,
    #[serde(default)]
    pub entry_condition: String,
    pub urgency: Urgency,
}

impl EntryPoint {
    /// Inclusive on both ends.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.entry_low && price <= self.entry_high
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HoldStrategy {
    pub minimum_hold: String,
    pub optimal_hold: String,
    pub hold_rationale: String,
    pub review_triggers: Vec<String>,
    pub position_sizing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellSentiment {
    pub sell_signal: SellSignal,
    #[serde(default)]
    pub sell_trigger_price: Option<f64>,
    pub stop_loss: f64,
    pub profit_target: f64,
    #[serde(default)]
    pub sell_rationale: String,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub current_sentiment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub rating: Rating,
    pub target_price: f64,
    /// Percent upside (negative for downside) to the target.
    #[serde(rename = "updownside", default)]
    pub upside_pct: f64,
    #[serde(default)]
    pub thesis: String,
    #[serde(default)]
    pub bull_case: String,
    #[serde(default)]
    pub bear_case: String,
    #[serde(default)]
    pub key_risks: Vec<String>,
    #[serde(default)]
    pub catalysts: Vec<String>,
    #[serde(default)]
    pub technical_outlook: String,
    #[serde(default)]
    pub analyst_consensus: String,
    pub entry_point: EntryPoint,
    pub hold_strategy: HoldStrategy,
    pub sell_sentiment: SellSentiment,
}

impl Assessment {
    fn validate(&self) -> Result<(), AdvisoryError> {
        positive("targetPrice", self.target_price)?;
        positive("entryPoint.idealEntry", self.entry_point.ideal_entry)?;
        positive("entryPoint.entryLow", self.entry_point.entry_low)?;
        positive("entryPoint.entryHigh", self.entry_point.entry_high)?;
        positive("sellSentiment.stopLoss", self.sell_sentiment.stop_loss)?;
        positive("sellSentiment.profitTarget", self.sell_sentiment.profit_target)?;
        if let Some(trigger) = self.sell_sentiment.sell_trigger_price {
            positive("sellSentiment.sellTriggerPrice", trigger)?;
        }

        if self.entry_point.entry_low > self.entry_point.entry_high {
            return Err(AdvisoryError::InvalidField {
                field: "entryPoint",
                reason: format!(
                    "entryLow {} is above entryHigh {}",
                    self.entry_point.entry_low, self.entry_point.entry_high
                ),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), AdvisoryError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AdvisoryError::InvalidField {
            field,
            reason: format!("expected a positive price, got {}", value),
        })
    }
}

/// Removes every ```` ```json ```` and ```` ``` ```` marker and trims.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

pub fn parse_assessment(raw: &str) -> Result<Assessment, AdvisoryError> {
    let cleaned = strip_code_fences(raw);
    let assessment: Assessment = serde_json::from_str(&cleaned)?;
    assessment.validate()?;
    Ok(assessment)
}
