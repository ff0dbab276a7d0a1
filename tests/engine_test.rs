//! Engine behaviour on a paused clock: ticking cadence, toast expiry,
//! idempotent activation and reset while a fetch is in flight.

mod common;

use apex_mkts::config::AppConfig;
use apex_mkts::core::engine::Engine;
use apex_mkts::core::simulation::DashboardView;
use apex_mkts::types::{Command, UiEvent};
use common::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};

struct Harness {
    commands: mpsc::Sender<Command>,
    events: mpsc::Receiver<UiEvent>,
    handle: JoinHandle<anyhow::Result<()>>,
}

fn start(advisor: Arc<MockAdvisor>) -> Harness {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (ui_tx, ui_rx) = mpsc::channel(256);
    let mut engine = Engine::new(AppConfig::default(), advisor, cmd_rx, ui_tx).with_seed(42);
    let handle = tokio::spawn(async move { engine.run().await });
    Harness {
        commands: cmd_tx,
        events: ui_rx,
        handle,
    }
}

impl Harness {
    async fn send(&self, command: Command) {
        self.commands.send(command).await.unwrap();
    }

    /// Next snapshot satisfying `pred`, skipping everything else.
    async fn snapshot_where(&mut self, pred: impl Fn(&DashboardView) -> bool) -> DashboardView {
        timeout(Duration::from_secs(120), async {
            loop {
                match self.events.recv().await {
                    Some(UiEvent::Snapshot(view)) if pred(&*view) => return *view,
                    Some(_) => {}
                    None => panic!("engine closed the ui channel"),
                }
            }
        })
        .await
        .expect("no matching snapshot")
    }

    async fn shutdown(self) {
        self.commands.send(Command::Shutdown).await.unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn ticks_every_seven_seconds() {
    let started = Instant::now();
    let mut h = start(Arc::new(MockAdvisor::new(quiet_reply())));

    let first = h.snapshot_where(|_| true).await;
    assert_eq!(first.tick_count, 0);

    h.snapshot_where(|v| v.tick_count == 2).await;
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(14), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(15), "elapsed {:?}", elapsed);

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn duplicate_activation_fetches_once() {
    let advisor = Arc::new(MockAdvisor::new(quiet_reply()).with_delay(Duration::from_secs(1)));
    let mut h = start(Arc::clone(&advisor));
    h.snapshot_where(|_| true).await;

    h.send(Command::Activate("NVDA".to_string())).await;
    h.send(Command::Activate("NVDA".to_string())).await;

    let pending = h.snapshot_where(|v| v.instruments[0].pending).await;
    assert!(pending.instruments[0].assessment.is_none());

    let active = h
        .snapshot_where(|v| v.instruments[0].assessment.is_some())
        .await;
    assert!(!active.instruments[0].pending);
    assert!(active.instruments[0].guidance.is_some());

    h.send(Command::Activate("NVDA".to_string())).await;
    h.snapshot_where(|v| v.tick_count == 1).await;
    assert_eq!(advisor.calls(), 1);

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn toasts_expire_after_eight_seconds_and_stay_in_log() {
    let reply = reply_json((1.0, 2.0), 0.5, 1_000_000.0, "IMMEDIATE", "HOLD");
    let mut h = start(Arc::new(MockAdvisor::new(reply)));
    h.snapshot_where(|_| true).await;

    h.send(Command::Activate("MSFT".to_string())).await;
    let shown = h.snapshot_where(|v| v.toasts.len() == 1).await;
    let shown_at = Instant::now();
    assert!(shown.toasts[0].message.starts_with("IMMEDIATE entry at"));

    let gone = h.snapshot_where(|v| v.toasts.is_empty()).await;
    let lived = shown_at.elapsed();
    assert!(lived >= Duration::from_secs(8), "lived {:?}", lived);
    assert!(lived < Duration::from_secs(9), "lived {:?}", lived);
    assert_eq!(gone.log.len(), 1);
    assert_eq!(gone.unread, 1);

    h.send(Command::MarkAllRead).await;
    h.snapshot_where(|v| v.unread == 0).await;

    h.send(Command::ClearLog).await;
    h.snapshot_where(|v| v.log.is_empty()).await;

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn dismiss_removes_toast_but_not_log_entry() {
    let reply = reply_json((1.0, 2.0), 0.5, 1_000_000.0, "PATIENT", "HOLD");
    let mut h = start(Arc::new(MockAdvisor::new(reply)));
    h.snapshot_where(|_| true).await;

    h.send(Command::Activate("CRWD".to_string())).await;
    let shown = h.snapshot_where(|v| v.toasts.len() == 1).await;

    h.send(Command::DismissToast(shown.toasts[0].id)).await;
    let after = h.snapshot_where(|v| v.toasts.is_empty()).await;
    assert_eq!(after.log.len(), 1);
    assert!(after.log[0].message.starts_with("Patient zone"));

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn reset_drops_in_flight_result() {
    let advisor = Arc::new(MockAdvisor::new(quiet_reply()).with_delay(Duration::from_secs(5)));
    let mut h = start(Arc::clone(&advisor));
    let opening = h.snapshot_where(|_| true).await;

    h.send(Command::Activate("ASML".to_string())).await;
    h.send(Command::Reset).await;

    // the fetch lands at 5s, the first tick after reset at 7s
    let later = h.snapshot_where(|v| v.tick_count == 1).await;
    assert_eq!(advisor.calls(), 1);
    let asml = &later.instruments[4];
    assert!(asml.assessment.is_none());
    assert!(!asml.pending);
    assert!(later.log.is_empty());
    assert_eq!(opening.instruments[4].state.open, asml.state.open);

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn fetch_from_before_reset_does_not_complete_reactivation() {
    let loud = reply_json((1.0, 2.0), 0.5, 1_000_000.0, "IMMEDIATE", "SELL");
    let advisor = Arc::new(
        MockAdvisor::new(loud)
            .then(quiet_reply())
            .with_delay(Duration::from_secs(5)),
    );
    let mut h = start(Arc::clone(&advisor));
    h.snapshot_where(|_| true).await;

    // first fetch lands at 5s, the post-reset one at 7s
    h.send(Command::Activate("NVDA".to_string())).await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    h.send(Command::Reset).await;
    h.send(Command::Activate("NVDA".to_string())).await;

    let done = h
        .snapshot_where(|v| v.instruments[0].assessment.is_some())
        .await;
    assert_eq!(advisor.calls(), 2);
    let nvda = &done.instruments[0];
    assert_eq!(nvda.assessment.as_ref().unwrap().entry_point.urgency.label(), "WAIT FOR DIP");
    assert!(done.log.is_empty());
    assert!(done.toasts.is_empty());

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn unknown_ticker_is_reported_not_fatal() {
    let mut h = start(Arc::new(MockAdvisor::new(quiet_reply())));
    h.snapshot_where(|_| true).await;

    h.send(Command::Activate("AAPL".to_string())).await;
    let log = timeout(Duration::from_secs(5), async {
        loop {
            if let Some(UiEvent::Log(msg)) = h.events.recv().await {
                return msg;
            }
        }
    })
    .await
    .unwrap();
    assert!(log.contains("AAPL"));

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn engine_stops_when_commands_close() {
    let h = start(Arc::new(MockAdvisor::new(quiet_reply())));
    drop(h.commands);
    h.handle.await.unwrap().unwrap();
}
