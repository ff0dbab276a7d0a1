// src/core/engine.rs
use crate::config::AppConfig;
use crate::connectors::assessment::Assessment;
use crate::connectors::traits::AdvisoryClient;
use crate::core::simulation::{ActivationOutcome, Simulation};
use crate::error::AdvisoryError;
use crate::types::{Command, UiEvent};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

/// Ticker, claim token, outcome of the fetch.
type FetchResult = (String, u64, Result<Assessment, AdvisoryError>);

/// Owns the simulation and is its only writer. Ticks on a fixed interval,
/// applies dashboard commands, and folds finished assessment fetches back
/// in. Fetches themselves run on their own tasks.
pub struct Engine {
    config: AppConfig,
    simulation: Simulation,
    advisor: Arc<dyn AdvisoryClient>,
    command_receiver: mpsc::Receiver<Command>,
    ui_sender: mpsc::Sender<UiEvent>,
    results_tx: mpsc::Sender<FetchResult>,
    results_rx: mpsc::Receiver<FetchResult>,
    rng: StdRng,
}

impl Engine {
    pub fn new(
        config: AppConfig,
        advisor: Arc<dyn AdvisoryClient>,
        command_receiver: mpsc::Receiver<Command>,
        ui_sender: mpsc::Sender<UiEvent>,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::channel(16);
        Self {
            simulation: Simulation::new(&config),
            config,
            advisor,
            command_receiver,
            ui_sender,
            results_tx,
            results_rx,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fixes the live-tick random source, for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    fn send_ui_event(&self, event: UiEvent) {
        match self.ui_sender.try_send(event) {
            Ok(_) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {}
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("UI Channel closed! Interface is likely dead.");
            }
        }
    }

    fn publish(&self) {
        self.send_ui_event(UiEvent::Snapshot(Box::new(self.simulation.view())));
    }

    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Engine starting: tick every {:?}, toasts live {:?}",
            self.config.tick_interval(),
            self.config.toast_ttl()
        );

        let mut ticks = interval(self.config.tick_interval());
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick is immediate; prices should first move one period in
        ticks.tick().await;
        self.publish();

        loop {
            let next_expiry = self.simulation.next_toast_expiry();

            tokio::select! {
                _ = ticks.tick() => {
                    self.simulation.tick(&mut self.rng, Instant::now());
                    self.publish();
                }
                command = self.command_receiver.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => {
                        self.handle_command(command);
                        self.publish();
                    }
                },
                Some((ticker, token, result)) = self.results_rx.recv() => {
                    self.finish_activation(&ticker, token, result);
                    self.publish();
                }
                _ = sleep_until(next_expiry.unwrap_or_else(Instant::now)),
                    if next_expiry.is_some() =>
                {
                    self.simulation.expire_toasts(Instant::now());
                    self.publish();
                }
            }
        }

        info!("Engine stopped after {} ticks", self.simulation.tick_count());
        Ok(())
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Activate(ticker) => self.start_activation(&ticker),
            Command::DismissToast(id) => {
                self.simulation.dismiss(id);
            }
            Command::ClearLog => self.simulation.clear_log(),
            Command::MarkAllRead => self.simulation.mark_all_read(),
            Command::Reset => self.simulation.reset(),
            Command::Shutdown => {}
        }
    }

    fn start_activation(&mut self, ticker: &str) {
        let claim = match self.simulation.begin_activation(ticker) {
            Ok(Some(claim)) => claim,
            Ok(None) => return,
            Err(e) => {
                warn!("Activation rejected: {}", e);
                self.send_ui_event(UiEvent::Log(e.to_string()));
                return;
            }
        };

        info!("Activating {} (claim {})...", claim.request.ticker, claim.token);
        let advisor = Arc::clone(&self.advisor);
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = advisor.assess(&claim.request).await;
            if results
                .send((claim.request.ticker, claim.token, result))
                .await
                .is_err()
            {
                error!("Engine gone before assessment result could be delivered");
            }
        });
    }

    fn finish_activation(
        &mut self,
        ticker: &str,
        token: u64,
        result: Result<Assessment, AdvisoryError>,
    ) {
        match self
            .simulation
            .complete_activation(ticker, token, result, Instant::now())
        {
            Ok(ActivationOutcome::Activated(ids)) => {
                self.send_ui_event(UiEvent::Log(format!(
                    "{} assessment active ({} alert(s))",
                    ticker,
                    ids.len()
                )));
            }
            Ok(ActivationOutcome::Failed(reason)) => {
                self.send_ui_event(UiEvent::Log(format!(
                    "{} assessment failed: {}",
                    ticker, reason
                )));
            }
            Ok(ActivationOutcome::Stale) => {}
            Err(e) => error!("Assessment result for unknown ticker: {}", e),
        }
    }
}
