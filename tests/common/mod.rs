#![allow(dead_code)]

use apex_mkts::connectors::assessment::{parse_assessment, Assessment};
use apex_mkts::connectors::prompt::AssessmentRequest;
use apex_mkts::connectors::traits::AdvisoryClient;
use apex_mkts::error::AdvisoryError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Advisory reply in the wire shape, with the thresholds the tests care about.
pub fn reply_json(
    entry: (f64, f64),
    stop_loss: f64,
    profit_target: f64,
    urgency: &str,
    sell_signal: &str,
) -> String {
    format!(
        r#"{{"rating":"BUY","targetPrice":{target},"updownside":12.5,
        "thesis":"Durable growth.","keyRisks":["Valuation"],"catalysts":["Earnings"],
        "entryPoint":{{"idealEntry":{ideal},"entryLow":{lo},"entryHigh":{hi},"urgency":"{urgency}"}},
        "holdStrategy":{{"optimalHold":"12 months"}},
        "sellSentiment":{{"sellSignal":"{signal}","stopLoss":{stop},"profitTarget":{target}}}}}"#,
        target = profit_target,
        ideal = (entry.0 + entry.1) / 2.0,
        lo = entry.0,
        hi = entry.1,
        urgency = urgency,
        stop = stop_loss,
        signal = sell_signal,
    )
}

/// Quiet reply: zone far below any live price, no activation alerts.
pub fn quiet_reply() -> String {
    reply_json((1.0, 2.0), 0.5, 1_000_000.0, "WAIT", "HOLD")
}

/// Answers call `n` with `replies[n]`, repeating the last reply once the
/// list runs out.
pub struct MockAdvisor {
    pub replies: Vec<Result<String, String>>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl MockAdvisor {
    pub fn new(reply: String) -> Self {
        Self {
            replies: vec![Ok(reply)],
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            replies: vec![Err(reason.to_string())],
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn then(mut self, reply: String) -> Self {
        self.replies.push(Ok(reply));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdvisoryClient for MockAdvisor {
    async fn assess(&self, _request: &AssessmentRequest) -> Result<Assessment, AdvisoryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let reply = self.replies.get(call).or(self.replies.last());
        match reply.ok_or(AdvisoryError::EmptyResponse)? {
            Ok(json) => parse_assessment(json),
            Err(reason) => Err(AdvisoryError::Status {
                status: 500,
                body: reason.clone(),
            }),
        }
    }
}
