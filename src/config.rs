//! Configuration types for oi-screener

use crate::exchange::{BinanceConfig, Exchange, MarketType};
use crate::window::RETENTION_HORIZON;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    pub screener: ScreenerSettings,
    #[serde(default)]
    pub binance: BinanceConfig,
    pub telemetry: TelemetryConfig,
}

/// Exchange selection
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    pub name: Exchange,
    #[serde(default)]
    pub market_type: MarketType,
}

/// Overrides for the per-exchange request tuning table
///
/// Anything left out falls back to the built-in table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcquisitionConfig {
    pub default_poll_interval_secs: Option<u64>,
    pub default_chunk_size: Option<usize>,
    pub default_chunk_interval_ms: Option<u64>,
    pub ticker_refresh_interval_secs: Option<u64>,
    #[serde(default)]
    pub poll_interval_secs: HashMap<Exchange, u64>,
    #[serde(default)]
    pub chunk_size: HashMap<Exchange, usize>,
    #[serde(default)]
    pub chunk_interval_ms: HashMap<Exchange, u64>,
}

/// Detection settings, replaceable while the screener runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerSettings {
    /// Minimum open interest growth in percent to alert on
    pub min_growth_pct: f64,
    /// Lookback window for the growth calculation (seconds)
    pub lookback_secs: u64,
    /// How long a symbol stays silent after an alert (seconds)
    pub cooldown_secs: u64,
    /// Master switch; detection is skipped while false
    #[serde(default = "default_true")]
    pub ready: bool,
    /// Telegram bot token
    #[serde(default)]
    pub bot_token: String,
    /// Telegram chat to deliver alerts to
    #[serde(default)]
    pub chat_id: String,
}

fn default_true() -> bool {
    true
}

impl ScreenerSettings {
    /// Whether detection may run: enabled and notifier credentials present
    pub fn is_ready(&self) -> bool {
        self.ready && !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

impl Default for ScreenerSettings {
    fn default() -> Self {
        Self {
            min_growth_pct: 10.0,
            lookback_secs: 300,
            cooldown_secs: 600,
            ready: false,
            bot_token: String::new(),
            chat_id: String::new(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    pub metrics_port: Option<u16>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the screener cannot honor
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_settings(&self.screener)?;

        let sizes = self
            .acquisition
            .default_chunk_size
            .into_iter()
            .chain(self.acquisition.chunk_size.values().copied());
        for size in sizes {
            anyhow::ensure!(size > 0, "chunk size must be positive");
        }

        let poll_intervals = self
            .acquisition
            .default_poll_interval_secs
            .into_iter()
            .chain(self.acquisition.poll_interval_secs.values().copied());
        for secs in poll_intervals {
            anyhow::ensure!(secs > 0, "poll interval must be positive");
        }
        anyhow::ensure!(
            self.acquisition.ticker_refresh_interval_secs != Some(0),
            "ticker_refresh_interval_secs must be positive"
        );
        Ok(())
    }
}

/// Validate detection settings on their own, e.g. before a hot swap
pub fn validate_settings(settings: &ScreenerSettings) -> anyhow::Result<()> {
    let retention_secs = RETENTION_HORIZON.as_secs();
    anyhow::ensure!(settings.lookback_secs > 0, "lookback_secs must be positive");
    anyhow::ensure!(
        settings.lookback_secs <= retention_secs,
        "lookback_secs ({}) exceeds the {}s retention horizon",
        settings.lookback_secs,
        retention_secs
    );
    anyhow::ensure!(
        settings.min_growth_pct.is_finite() && settings.min_growth_pct >= 0.0,
        "min_growth_pct must be a non-negative number"
    );
    Ok(())
}
