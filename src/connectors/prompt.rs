// src/connectors/prompt.rs
use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{InstrumentMeta, InstrumentState};
use crate::utils::format::market_cap;

/// Live snapshot handed to the advisory service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub price: f64,
    pub pct_change: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    /// Pre-formatted, e.g. `$4.58T`.
    pub mkt_cap: String,
    pub pe: f64,
    pub eps: f64,
    pub beta: f64,
    pub div: f64,
    pub lo52: f64,
    pub hi52: f64,
}

impl AssessmentRequest {
    pub fn new(meta: &InstrumentMeta, state: &InstrumentState) -> Self {
        Self {
            ticker: meta.ticker.to_string(),
            name: meta.name.to_string(),
            sector: meta.sector.to_string(),
            price: state.price,
            pct_change: state.pct_change,
            open: state.open,
            high: state.high,
            low: state.low,
            mkt_cap: market_cap(meta.market_cap),
            pe: meta.pe,
            eps: meta.eps,
            beta: meta.beta,
            div: meta.dividend_yield,
            lo52: meta.low_52w,
            hi52: meta.high_52w,
        }
    }
}

const REPLY_SCHEMA: &str = r#"{"rating":"STRONG BUY"|"BUY"|"HOLD"|"SELL"|"STRONG SELL","targetPrice":N,"updownside":N,"thesis":"<2-3 sentences>","bullCase":"<1-2 sentences>","bearCase":"<1-2 sentences>","keyRisks":["r1","r2","r3"],"catalysts":["c1","c2"],"technicalOutlook":"<brief>","analystConsensus":"<brief>","entryPoint":{"idealEntry":N,"entryLow":N,"entryHigh":N,"entryRationale":"<1 sentence>","entryCondition":"<specific signal>","urgency":"IMMEDIATE"|"PATIENT"|"WAIT"},"holdStrategy":{"minimumHold":"<period>","optimalHold":"<period>","holdRationale":"<1-2 sentences>","reviewTriggers":["t1","t2"],"positionSizing":"<% portfolio>"},"sellSentiment":{"sellSignal":"HOLD"|"TRIM"|"SELL"|"URGENT SELL","sellTriggerPrice":N,"stopLoss":N,"profitTarget":N,"sellRationale":"<1-2 sentences>","redFlags":["f1","f2"],"currentSentiment":"<1 sentence>"}}"#;

pub fn build_prompt(req: &AssessmentRequest, as_of: NaiveDate) -> String {
    let sign = if req.pct_change >= 0.0 { "+" } else { "" };
    format!(
        "You are a senior equity research analyst at a top-tier hedge fund. Assess {name} ({ticker}) as of {date}.\n\
         Live data: Price ${price} ({sign}{pct:.2}% today) | Open ${open} | Hi ${high} | Lo ${low}\n\
         MktCap {cap} | P/E {pe}x | EPS ${eps} | Beta {beta} | DivYield {div}% | 52W ${lo52}--${hi52} | Sector {sector}\n\
         Reply ONLY with JSON (no markdown):\n{schema}",
        name = req.name,
        ticker = req.ticker,
        date = as_of.format("%b %-d, %Y"),
        price = req.price,
        sign = sign,
        pct = req.pct_change,
        open = req.open,
        high = req.high,
        low = req.low,
        cap = req.mkt_cap,
        pe = req.pe,
        eps = req.eps,
        beta = req.beta,
        div = req.div,
        lo52 = req.lo52,
        hi52 = req.hi52,
        sector = req.sector,
        schema = REPLY_SCHEMA,
    )
}
