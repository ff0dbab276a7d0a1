// src/config.rs

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AdvisorConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    // Falls back to ANTHROPIC_API_KEY when empty
    #[serde(default)]
    pub api_key: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1500,
            temperature: 0.3,
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub tick_interval_ms: u64,
    pub toast_ttl_ms: u64,
    pub toast_capacity: usize,
    pub log_capacity: usize,
    pub log_dir: String,
    pub log_level: String,
    pub advisor: AdvisorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 7_000,
            toast_ttl_ms: 8_000,
            toast_capacity: 4,
            log_capacity: 80,
            log_dir: "logs".to_string(),
            log_level: "info".to_string(),
            advisor: AdvisorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, then an optional `Settings.*` file, then `APP__*` env vars.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("Settings").required(false))
                .add_source(Environment::with_prefix("APP").separator("__")),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let d = AppConfig::default();
        let config = Config::builder()
            .set_default("tick_interval_ms", d.tick_interval_ms)?
            .set_default("toast_ttl_ms", d.toast_ttl_ms)?
            .set_default("toast_capacity", d.toast_capacity as u64)?
            .set_default("log_capacity", d.log_capacity as u64)?
            .set_default("log_dir", d.log_dir)?
            .set_default("log_level", d.log_level)?
            .set_default("advisor.base_url", d.advisor.base_url)?
            .set_default("advisor.model", d.advisor.model)?
            .set_default("advisor.max_tokens", u64::from(d.advisor.max_tokens))?
            .set_default("advisor.temperature", d.advisor.temperature)?
            .set_default("advisor.api_key", d.advisor.api_key)?
            .add_source(builder.build()?)
            .build()?;

        let mut app: AppConfig = config.try_deserialize()?;
        if app.advisor.api_key.is_empty() {
            app.advisor.api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
        }
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Message("tick_interval_ms must be > 0".into()));
        }
        if self.toast_capacity == 0 || self.log_capacity == 0 {
            return Err(ConfigError::Message(
                "notification capacities must be > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }
}
