// src/main.rs
use apex_mkts::config::AppConfig;
use apex_mkts::connectors::llm::LlmAdvisor;
use apex_mkts::core::engine::Engine;
use apex_mkts::tui;
use apex_mkts::types::Command;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // 1. Load Configuration
    let config = AppConfig::new()?;

    // 2. Logging goes to a file; the terminal belongs to the dashboard
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "apex_mkts.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    info!("========================================");
    info!("       APEX MKTS - v{}", env!("CARGO_PKG_VERSION"));
    info!("========================================");

    // 3. Initialize Components
    let advisor = LlmAdvisor::new(&config.advisor)?;
    info!("Advisor endpoint: {}", advisor.endpoint());
    if config.advisor.api_key.is_empty() {
        warn!("No API key configured; activations will fail until one is set");
    }

    // 4. Create Channels
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (ui_tx, ui_rx) = mpsc::channel(100);

    // 5. Run Engine
    let mut engine = Engine::new(config, Arc::new(advisor), cmd_rx, ui_tx);
    let engine_handle = tokio::spawn(async move {
        if let Err(e) = engine.run().await {
            error!("Fatal Engine Error: {}", e);
        }
    });

    // 6. Dashboard owns the main task until the user quits
    let ui_result = tui::run(ui_rx, cmd_tx.clone()).await;
    let _ = cmd_tx.send(Command::Shutdown).await;
    drop(cmd_tx);
    if let Err(e) = engine_handle.await {
        error!("Engine task panicked: {}", e);
    }

    ui_result
}
