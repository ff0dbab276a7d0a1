// src/core/simulation.rs
//! The whole session in one owned value. Every mutation goes through one of
//! the operations here (tick, activation, dismiss, clear, mark-read, reset);
//! the engine is the only caller in the running program.

use chrono::{DateTime, Local};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::connectors::assessment::Assessment;
use crate::connectors::prompt::AssessmentRequest;
use crate::connectors::traits::AdvisoryClient;
use crate::core::guidance::Guidance;
use crate::core::notifications::NotificationStore;
use crate::core::portfolio::{self, PortfolioSnapshot, PositionPnl};
use crate::core::signals::{activation_signals, SignalEvent, SignalTracker};
use crate::error::{AdvisoryError, SimulationError};
use crate::market::synth::synthesize;
use crate::market::universe::UNIVERSE;
use crate::types::{InstrumentMeta, InstrumentState, Notification};
use crate::utils::precision::round_cents;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Stored; carries the ids of the activation notifications.
    Activated(Vec<u64>),
    /// The fetch failed; nothing stored, the ticker can be retried.
    Failed(String),
    /// Nobody was waiting for this result any more (e.g. after a reset).
    Stale,
}

/// A claimed activation: the request to send out and the token its result
/// must carry back to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationClaim {
    pub token: u64,
    pub request: AssessmentRequest,
}

#[derive(Debug, Clone)]
pub struct InstrumentView {
    pub meta: &'static InstrumentMeta,
    pub state: InstrumentState,
    pub position: PositionPnl,
    pub assessment: Option<Arc<Assessment>>,
    pub guidance: Option<Guidance>,
    pub pending: bool,
}

/// Read-only picture of the session handed to the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub instruments: Vec<InstrumentView>,
    pub portfolio: PortfolioSnapshot,
    pub pnl_series: Vec<f64>,
    /// One row per held instrument at [`portfolio::PNL_TABLE_OFFSETS`].
    pub pnl_table: Vec<(&'static str, Vec<f64>)>,
    pub toasts: Vec<Notification>,
    pub log: Vec<Notification>,
    pub unread: usize,
    pub tick_count: u64,
    pub last_tick: Option<DateTime<Local>>,
}

pub struct Simulation {
    universe: &'static [InstrumentMeta],
    states: HashMap<String, InstrumentState>,
    trackers: HashMap<String, SignalTracker>,
    /// Ticker -> token of the one fetch allowed to complete it.
    pending: HashMap<String, u64>,
    next_claim: u64,
    notifications: NotificationStore,
    tick_count: u64,
    last_tick: Option<DateTime<Local>>,
}

impl Simulation {
    pub fn new(config: &AppConfig) -> Self {
        let store = NotificationStore::new(
            config.toast_capacity,
            config.log_capacity,
            config.toast_ttl(),
        );
        Self::with_universe(&UNIVERSE, store)
    }

    /// Synthesizes opening state for every instrument in `universe`.
    pub fn with_universe(universe: &'static [InstrumentMeta], store: NotificationStore) -> Self {
        let states = universe
            .iter()
            .map(|m| (m.ticker.to_string(), synthesize(m)))
            .collect();
        Self::from_states(universe, states, store)
    }

    /// Starts from explicit states; instruments missing from `states` stay
    /// untracked and contribute nothing to the portfolio.
    pub fn from_states(
        universe: &'static [InstrumentMeta],
        states: HashMap<String, InstrumentState>,
        notifications: NotificationStore,
    ) -> Self {
        let trackers = states
            .iter()
            .map(|(t, s)| (t.clone(), SignalTracker::new(s.price)))
            .collect();
        Self {
            universe,
            states,
            trackers,
            pending: HashMap::new(),
            next_claim: 0,
            notifications,
            tick_count: 0,
            last_tick: None,
        }
    }

    fn meta(&self, ticker: &str) -> Result<&'static InstrumentMeta, SimulationError> {
        self.universe
            .iter()
            .find(|m| m.ticker.eq_ignore_ascii_case(ticker))
            .ok_or_else(|| SimulationError::UnknownTicker(ticker.to_string()))
    }

    pub fn state(&self, ticker: &str) -> Option<&InstrumentState> {
        self.states.get(ticker)
    }

    pub fn assessment(&self, ticker: &str) -> Option<&Arc<Assessment>> {
        self.trackers.get(ticker).and_then(|t| t.assessment())
    }

    pub fn is_pending(&self, ticker: &str) -> bool {
        self.pending.contains_key(ticker)
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// One live update of every instrument. Returns the ids of any
    /// notifications the price moves raised.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Instant) -> Vec<u64> {
        let mut fired = Vec::new();
        for meta in self.universe {
            if !self.states.contains_key(meta.ticker) {
                continue;
            }
            let nudge = (rng.gen::<f64>() - 0.498) * meta.base_price * 0.0016;
            fired.extend(self.nudge_one(meta, nudge, now));
        }
        self.tick_count += 1;
        self.last_tick = Some(Local::now());
        debug!("Tick #{} done, {} notification(s)", self.tick_count, fired.len());
        fired
    }

    /// Applies a single price nudge to `ticker` and runs the signal check.
    pub fn apply_nudge(
        &mut self,
        ticker: &str,
        nudge: f64,
        now: Instant,
    ) -> Result<Vec<u64>, SimulationError> {
        let meta = self.meta(ticker)?;
        if !self.states.contains_key(meta.ticker) {
            return Err(SimulationError::UnknownTicker(ticker.to_string()));
        }
        Ok(self.nudge_one(meta, nudge, now))
    }

    fn nudge_one(&mut self, meta: &InstrumentMeta, nudge: f64, now: Instant) -> Vec<u64> {
        let Some(state) = self.states.get_mut(meta.ticker) else {
            return Vec::new();
        };

        state.price = round_cents(state.price + nudge);
        state.change = round_cents(state.change + nudge);
        // always relative to the session open, not the previous tick
        state.pct_change = if state.open == 0.0 {
            0.0
        } else {
            round_cents(state.change / state.open * 100.0)
        };
        if !state.history.is_empty() {
            state.history.rotate_left(1);
        }
        if let Some(last) = state.history.last_mut() {
            *last = state.price;
        }
        let price = state.price;

        let events = self
            .trackers
            .entry(meta.ticker.to_string())
            .or_insert_with(|| SignalTracker::new(price))
            .observe(meta.ticker, price);
        self.record(meta.ticker, events, now)
    }

    fn record(&mut self, ticker: &str, events: Vec<SignalEvent>, now: Instant) -> Vec<u64> {
        events
            .into_iter()
            .map(|e| {
                info!("{} {}: {}", e.kind.title(), ticker, e.message);
                self.notifications.push(ticker, e.kind, e.message, now)
            })
            .collect()
    }

    /// Claims `ticker` for an assessment fetch. `Ok(None)` when it already
    /// has an assessment or a fetch is in flight.
    pub fn begin_activation(
        &mut self,
        ticker: &str,
    ) -> Result<Option<ActivationClaim>, SimulationError> {
        let meta = self.meta(ticker)?;
        if self.assessment(meta.ticker).is_some() || self.pending.contains_key(meta.ticker) {
            debug!("Activation of {} ignored: already active or in flight", meta.ticker);
            return Ok(None);
        }

        let request = self
            .states
            .get(meta.ticker)
            .map(|state| AssessmentRequest::new(meta, state))
            .ok_or_else(|| SimulationError::UnknownTicker(ticker.to_string()))?;
        self.next_claim += 1;
        self.pending.insert(meta.ticker.to_string(), self.next_claim);
        Ok(Some(ActivationClaim {
            token: self.next_claim,
            request,
        }))
    }

    /// Applies the result of the fetch holding `token`. A result whose claim
    /// was dropped (reset) or superseded is `Stale` and changes nothing.
    pub fn complete_activation(
        &mut self,
        ticker: &str,
        token: u64,
        result: Result<Assessment, AdvisoryError>,
        now: Instant,
    ) -> Result<ActivationOutcome, SimulationError> {
        let meta = self.meta(ticker)?;
        if self.pending.get(meta.ticker) != Some(&token) {
            debug!("Dropping stale assessment result for {} (claim {})", meta.ticker, token);
            return Ok(ActivationOutcome::Stale);
        }
        self.pending.remove(meta.ticker);

        let assessment = match result {
            Ok(a) => Arc::new(a),
            Err(e) => {
                warn!("Assessment for {} failed: {}", meta.ticker, e);
                return Ok(ActivationOutcome::Failed(e.to_string()));
            }
        };

        let price = match self.states.get(meta.ticker) {
            Some(s) => s.price,
            None => return Err(SimulationError::UnknownTicker(ticker.to_string())),
        };
        info!(
            "Assessment active for {}: {} target ${}",
            meta.ticker, assessment.rating, assessment.target_price
        );

        let events = activation_signals(&assessment);
        self.trackers
            .entry(meta.ticker.to_string())
            .or_insert_with(|| SignalTracker::new(price))
            .arm(assessment, price);

        Ok(ActivationOutcome::Activated(self.record(meta.ticker, events, now)))
    }

    /// Sequential activation for callers that can wait on the fetch.
    pub async fn activate(
        &mut self,
        client: &dyn AdvisoryClient,
        ticker: &str,
        now: Instant,
    ) -> Result<Option<ActivationOutcome>, SimulationError> {
        let Some(claim) = self.begin_activation(ticker)? else {
            return Ok(None);
        };
        let result = client.assess(&claim.request).await;
        self.complete_activation(&claim.request.ticker, claim.token, result, now)
            .map(Some)
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        self.notifications.dismiss(id)
    }

    pub fn clear_log(&mut self) {
        self.notifications.clear_log();
    }

    pub fn mark_all_read(&mut self) {
        self.notifications.mark_all_read();
    }

    pub fn expire_toasts(&mut self, now: Instant) -> usize {
        self.notifications.expire(now)
    }

    pub fn next_toast_expiry(&self) -> Option<Instant> {
        self.notifications.next_expiry()
    }

    /// Back to the opening state: fresh synthesized prices, no assessments,
    /// no notifications. In-flight fetches are orphaned and their results
    /// dropped on arrival.
    pub fn reset(&mut self) {
        self.states = self
            .universe
            .iter()
            .map(|m| (m.ticker.to_string(), synthesize(m)))
            .collect();
        self.trackers = self
            .states
            .iter()
            .map(|(t, s)| (t.clone(), SignalTracker::new(s.price)))
            .collect();
        self.pending.clear();
        self.notifications.reset();
        self.tick_count = 0;
        self.last_tick = None;
        info!("Session reset");
    }

    pub fn portfolio(&self) -> PortfolioSnapshot {
        portfolio::aggregate(self.universe, &self.states)
    }

    pub fn view(&self) -> DashboardView {
        let instruments = self
            .universe
            .iter()
            .filter_map(|meta| {
                let state = self.states.get(meta.ticker)?;
                let assessment = self.assessment(meta.ticker).cloned();
                let guidance = assessment.as_ref().map(|a| Guidance::new(state.price, a));
                Some(InstrumentView {
                    meta,
                    state: state.clone(),
                    position: portfolio::position_pnl(meta, state),
                    assessment,
                    guidance,
                    pending: self.pending.contains_key(meta.ticker),
                })
            })
            .collect();

        DashboardView {
            instruments,
            portfolio: self.portfolio(),
            pnl_series: portfolio::pnl_series(self.universe, &self.states),
            pnl_table: portfolio::pnl_table(self.universe, &self.states),
            toasts: self
                .notifications
                .toasts()
                .map(|t| t.notification.clone())
                .collect(),
            log: self.notifications.log().cloned().collect(),
            unread: self.notifications.unread_count(),
            tick_count: self.tick_count,
            last_tick: self.last_tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::assessment::{fixtures, SellSignal, Urgency};
    use crate::types::{NotificationKind, HISTORY_LEN};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn sim() -> Simulation {
        Simulation::new(&AppConfig::default())
    }

    /// Claims `ticker` and returns the token its result must carry.
    fn claim(sim: &mut Simulation, ticker: &str) -> u64 {
        sim.begin_activation(ticker).unwrap().unwrap().token
    }

    /// Nudge that lands `ticker` exactly on `target`.
    fn move_to(sim: &mut Simulation, ticker: &str, target: f64) -> Vec<u64> {
        let price = sim.state(ticker).unwrap().price;
        sim.apply_nudge(ticker, target - price, Instant::now()).unwrap()
    }

    #[test]
    fn ticks_keep_window_and_last_price() {
        let mut s = sim();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..250 {
            s.tick(&mut rng, Instant::now());
            for meta in UNIVERSE.iter() {
                let st = s.state(meta.ticker).unwrap();
                assert_eq!(st.history.len(), HISTORY_LEN);
                assert_eq!(st.history[HISTORY_LEN - 1], st.price);
            }
        }
        assert_eq!(s.tick_count(), 250);
    }

    #[test]
    fn nudge_updates_change_against_open() {
        let mut s = sim();
        let before = s.state("NVDA").unwrap().clone();
        s.apply_nudge("NVDA", 1.0, Instant::now()).unwrap();
        let after = s.state("NVDA").unwrap();

        assert_eq!(after.price, round_cents(before.price + 1.0));
        assert_eq!(after.change, round_cents(before.change + 1.0));
        assert_eq!(after.pct_change, round_cents(after.change / before.open * 100.0));
        assert_eq!(after.open, before.open);
        // window slid by one
        assert_eq!(after.history[0], before.history[1]);
        assert_eq!(after.history[HISTORY_LEN - 2], before.history[HISTORY_LEN - 1]);
    }

    #[test]
    fn activation_is_idempotent() {
        let mut s = sim();
        let token = claim(&mut s, "MSFT");
        // in flight
        assert!(s.begin_activation("MSFT").unwrap().is_none());

        let a = fixtures::assessment((1.0, 2.0), 0.5, 900.0, Urgency::Immediate, SellSignal::Sell);
        let outcome = s.complete_activation("MSFT", token, Ok(a), Instant::now()).unwrap();
        assert!(matches!(outcome, ActivationOutcome::Activated(ref ids) if ids.len() == 2));

        // already assessed
        assert!(s.begin_activation("MSFT").unwrap().is_none());
        assert_eq!(s.notifications().log_len(), 2);
    }

    #[test]
    fn failed_activation_leaves_ticker_retryable() {
        let mut s = sim();
        let token = claim(&mut s, "TSLA");
        let failure = Err(AdvisoryError::EmptyResponse);
        let outcome = s
            .complete_activation("TSLA", token, failure, Instant::now())
            .unwrap();
        assert!(matches!(outcome, ActivationOutcome::Failed(_)));
        assert!(s.assessment("TSLA").is_none());
        assert!(!s.is_pending("TSLA"));
        assert!(s.begin_activation("TSLA").unwrap().is_some());
    }

    #[test]
    fn unknown_ticker_is_an_error() {
        let mut s = sim();
        assert_eq!(
            s.begin_activation("AAPL"),
            Err(SimulationError::UnknownTicker("AAPL".to_string()))
        );
    }

    #[test]
    fn first_tick_after_activation_does_not_fire_spuriously() {
        let mut s = sim();
        let price = s.state("LLY").unwrap().price;
        // zone already contains the price at activation time
        let a = fixtures::quiet((price - 5.0, price + 5.0), 1.0, 10_000.0);
        let token = claim(&mut s, "LLY");
        s.complete_activation("LLY", token, Ok(a), Instant::now()).unwrap();

        assert!(move_to(&mut s, "LLY", price + 1.0).is_empty());
        assert!(move_to(&mut s, "LLY", price + 6.0).is_empty());
        assert_eq!(move_to(&mut s, "LLY", price + 4.0).len(), 1);
    }

    #[test]
    fn stop_loss_fires_through_ticks() {
        let mut s = sim();
        let token = claim(&mut s, "CRWD");
        let a = fixtures::quiet((10.0, 20.0), 400.0, 10_000.0);
        s.complete_activation("CRWD", token, Ok(a), Instant::now()).unwrap();

        move_to(&mut s, "CRWD", 405.0);
        let fired = move_to(&mut s, "CRWD", 400.0);
        assert_eq!(fired.len(), 1);
        assert!(move_to(&mut s, "CRWD", 395.0).is_empty());

        let n = s.notifications().log().next().unwrap();
        assert_eq!(n.kind, NotificationKind::Sell);
        assert_eq!(n.message, "CRWD breached stop-loss $400.00");
    }

    #[test]
    fn reset_drops_assessments_and_orphans_fetches() {
        let mut s = sim();
        let asml = claim(&mut s, "ASML");
        let nvda = claim(&mut s, "NVDA");
        let a = fixtures::assessment((1.0, 2.0), 0.5, 9e6, Urgency::Patient, SellSignal::Hold);
        s.complete_activation("ASML", asml, Ok(a.clone()), Instant::now()).unwrap();
        s.tick(&mut StdRng::seed_from_u64(1), Instant::now());

        s.reset();
        assert!(s.assessment("ASML").is_none());
        assert_eq!(s.notifications().log_len(), 0);
        assert_eq!(s.state("NVDA"), Some(&synthesize(&UNIVERSE[0])));
        assert_eq!(
            s.complete_activation("NVDA", nvda, Ok(a), Instant::now()).unwrap(),
            ActivationOutcome::Stale
        );
        assert!(s.assessment("NVDA").is_none());
    }

    #[test]
    fn pre_reset_result_cannot_complete_a_new_claim() {
        let mut s = sim();
        let old = claim(&mut s, "NVDA");
        s.reset();
        let fresh = claim(&mut s, "NVDA");
        assert_ne!(old, fresh);

        let stale =
            fixtures::assessment((1.0, 2.0), 0.5, 9e6, Urgency::Immediate, SellSignal::Sell);
        assert_eq!(
            s.complete_activation("NVDA", old, Ok(stale), Instant::now()).unwrap(),
            ActivationOutcome::Stale
        );
        // still waiting on the post-reset fetch
        assert!(s.is_pending("NVDA"));
        assert!(s.assessment("NVDA").is_none());
        assert_eq!(s.notifications().log_len(), 0);

        let a = fixtures::quiet((1.0, 2.0), 0.5, 9e6);
        assert_eq!(
            s.complete_activation("NVDA", fresh, Ok(a), Instant::now()).unwrap(),
            ActivationOutcome::Activated(vec![])
        );
        assert_eq!(s.assessment("NVDA").unwrap().entry_point.urgency, Urgency::Wait);
    }

    #[test]
    fn toasts_expire_but_log_stays() {
        let mut s = sim();
        let t0 = Instant::now();
        let token = claim(&mut s, "NVDA");
        let a = fixtures::assessment((1.0, 2.0), 0.5, 9e6, Urgency::Immediate, SellSignal::Hold);
        s.complete_activation("NVDA", token, Ok(a), t0).unwrap();

        assert_eq!(s.next_toast_expiry(), Some(t0 + Duration::from_secs(8)));
        assert_eq!(s.expire_toasts(t0 + Duration::from_secs(8)), 1);
        assert_eq!(s.view().toasts.len(), 0);
        assert_eq!(s.view().log.len(), 1);
    }

    #[test]
    fn view_lists_instruments_in_table_order() {
        let mut s = sim();
        s.begin_activation("TSLA").unwrap();
        let v = s.view();
        let order: Vec<&str> = v.instruments.iter().map(|i| i.meta.ticker).collect();
        assert_eq!(order, vec!["NVDA", "MSFT", "LLY", "TSLA", "ASML", "CRWD"]);
        assert!(v.instruments[3].pending);
        assert!(v.instruments[3].guidance.is_none());
        assert_eq!(v.pnl_series.len(), HISTORY_LEN);
        assert_eq!(v.pnl_table.len(), 6);
        assert_eq!(v.pnl_table[0].0, "NVDA");
        approx::assert_abs_diff_eq!(v.portfolio.pnl, v.portfolio.value - v.portfolio.cost);
    }
}
