//! Run command implementation

use crate::acquisition::{AcquisitionTuning, Producer};
use crate::config::Config;
use crate::detection::Consumer;
use crate::exchange::{BinanceConnector, Exchange, ExchangeConnector, ExchangeError, MarketType};
use crate::notify::{LogNotifier, Notifier, TelegramNotifier};
use crate::settings::SettingsHandle;
use crate::shutdown::RunFlag;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Log alerts instead of sending them to Telegram
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: Config, config_path: PathBuf) -> anyhow::Result<()> {
        let connector = binance_connector(&config)?;
        self.run_screener(connector, config, config_path).await
    }

    async fn run_screener<C: ExchangeConnector + 'static>(
        &self,
        connector: C,
        config: Config,
        config_path: PathBuf,
    ) -> anyhow::Result<()> {
        let running = RunFlag::new();
        let tuning = AcquisitionTuning::from_config(&config.acquisition);
        let producer = Arc::new(Producer::with_run_flag(connector, tuning, running.clone()));

        let mut screener = config.screener.clone();
        let notifier: Arc<dyn Notifier> = if self.dry_run {
            if screener.bot_token.is_empty() {
                screener.bot_token = "dry-run".to_string();
            }
            if screener.chat_id.is_empty() {
                screener.chat_id = "dry-run".to_string();
            }
            Arc::new(LogNotifier)
        } else {
            Arc::new(TelegramNotifier::new()?)
        };

        let settings = SettingsHandle::new(screener);
        if !settings.current().is_ready() {
            tracing::warn!("Screener settings not ready, detection idle until they are updated");
        }

        let mut consumer = Consumer::new(
            producer.clone(),
            notifier,
            settings.subscribe(),
            config.exchange.name,
            config.exchange.market_type,
        )
        .with_run_flag(running.clone());

        let producer_task = tokio::spawn(producer.clone().run());
        let consumer_task = tokio::spawn(async move { consumer.run().await });
        spawn_settings_reload(settings, config_path, running.clone(), self.dry_run);

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown requested");
        running.stop();

        let (producer_result, consumer_result) = tokio::join!(producer_task, consumer_task);
        producer_result?;
        consumer_result?;

        tracing::info!("Screener stopped");
        Ok(())
    }
}

/// Connector for the configured exchange and market
///
/// The Binance client polls USD-M futures only.
fn binance_connector(config: &Config) -> Result<BinanceConnector, ExchangeError> {
    match (config.exchange.name, config.exchange.market_type) {
        (Exchange::Binance, MarketType::Futures) => Ok(BinanceConnector::new(config.binance.clone())),
        (Exchange::Binance, MarketType::Spot) => Err(ExchangeError::Unsupported {
            exchange: Exchange::Binance,
            operation: "spot open interest",
        }),
        (other, _) => Err(ExchangeError::UnsupportedExchange(other)),
    }
}

/// Re-read `[screener]` from the config file on SIGHUP
#[cfg(unix)]
fn spawn_settings_reload(settings: SettingsHandle, path: PathBuf, running: RunFlag, dry_run: bool) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "SIGHUP handler unavailable, settings reload disabled");
                return;
            }
        };

        while hangup.recv().await.is_some() && running.is_running() {
            tracing::info!(path = %path.display(), "Reloading screener settings");
            let mut screener = match Config::load(&path) {
                Ok(config) => config.screener,
                Err(e) => {
                    tracing::warn!(error = %e, "Settings reload failed, keeping current settings");
                    continue;
                }
            };
            if dry_run {
                let current = settings.current();
                screener.bot_token = current.bot_token;
                screener.chat_id = current.chat_id;
            }
            if let Err(e) = settings.update(screener) {
                tracing::warn!(error = %e, "Rejected reloaded settings");
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_settings_reload(_settings: SettingsHandle, _path: PathBuf, _running: RunFlag, _dry_run: bool) {
    tracing::debug!("Settings reload on SIGHUP is only available on unix");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str, market_type: &str) -> Config {
        let toml = format!(
            r#"
            [exchange]
            name = "{name}"
            market_type = "{market_type}"

            [screener]
            min_growth_pct = 10.0
            lookback_secs = 300
            cooldown_secs = 900

            [telemetry]
            log_level = "info"
            "#
        );
        Config::parse(&toml).unwrap()
    }

    #[test]
    fn test_binance_futures_connector() {
        let connector = binance_connector(&config("binance", "futures")).unwrap();
        assert_eq!(connector.exchange(), Exchange::Binance);
    }

    #[test]
    fn test_binance_spot_rejected() {
        let err = binance_connector(&config("binance", "spot")).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Unsupported {
                exchange: Exchange::Binance,
                ..
            }
        ));
    }

    #[test]
    fn test_other_exchange_rejected() {
        let err = binance_connector(&config("bybit", "futures")).unwrap_err();
        assert!(matches!(err, ExchangeError::UnsupportedExchange(Exchange::Bybit)));
    }
}
