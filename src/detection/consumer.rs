//! Open interest spike consumer
//!
//! Scans the collected windows once per second, alerts on symbols whose
//! growth exceeds the configured threshold and silences them for the
//! cooldown period.

use super::{calculate_growth_pct, OiSpike};
use crate::acquisition::MarketDataSource;
use crate::config::ScreenerSettings;
use crate::cooldown::CooldownTracker;
use crate::exchange::{Exchange, MarketType};
use crate::notify::{create_text, Notifier};
use crate::settings::SettingsReader;
use crate::shutdown::RunFlag;
use crate::telemetry::{
    increment_counter, record_latency, set_gauge, CounterMetric, GaugeMetric, LatencyMetric,
};
use chrono::Utc;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Interval between detection passes
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Detection loop owning the cooldown tracker
pub struct Consumer {
    source: Arc<dyn MarketDataSource>,
    notifier: Arc<dyn Notifier>,
    settings: SettingsReader,
    exchange: Exchange,
    market_type: MarketType,
    cooldown: CooldownTracker<String>,
    running: RunFlag,
}

impl Consumer {
    /// Create a consumer reading from `source` and alerting through `notifier`
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        notifier: Arc<dyn Notifier>,
        settings: SettingsReader,
        exchange: Exchange,
        market_type: MarketType,
    ) -> Self {
        Self {
            source,
            notifier,
            settings,
            exchange,
            market_type,
            cooldown: CooldownTracker::new(),
            running: RunFlag::new(),
        }
    }

    /// Share an existing run flag instead of a private one
    pub fn with_run_flag(mut self, running: RunFlag) -> Self {
        self.running = running;
        self
    }

    /// Flag that stops [`Consumer::run`] when cleared
    pub fn run_flag(&self) -> RunFlag {
        self.running.clone()
    }

    /// Request the detection loop to stop
    pub fn stop(&self) {
        tracing::info!("Stopping consumer");
        self.running.stop();
    }

    /// Run detection ticks until stopped
    pub async fn run(&mut self) {
        tracing::info!(exchange = %self.exchange, market_type = %self.market_type, "Consumer started");

        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.running.is_running() {
            ticker.tick().await;
            if !self.running.is_running() {
                break;
            }
            self.tick().await;
        }

        tracing::info!("Consumer stopped");
    }

    /// One detection pass; returns the number of alerts dispatched
    ///
    /// Settings are read fresh on every call. Nothing happens while they
    /// are not ready.
    pub async fn tick(&mut self) -> usize {
        let settings = self.settings.latest();
        if !settings.is_ready() {
            return 0;
        }

        let start = Instant::now();
        self.cooldown.purge_expired();

        let windows = self.source.open_interest_snapshot().await;
        let ticker_daily = self.source.ticker_daily_snapshot().await;

        let since_ms = Utc::now().timestamp_millis() - settings.lookback_secs as i64 * 1000;
        let cooldown = Duration::from_secs(settings.cooldown_secs);

        let mut tasks = Vec::new();
        for (symbol, window) in windows {
            if window.is_empty() || self.cooldown.is_blocked(&symbol) {
                continue;
            }

            let Some(daily) = ticker_daily.get(&symbol).copied() else {
                tracing::warn!(%symbol, "Daily ticker data not found for symbol");
                continue;
            };

            let Some(change_pct) = calculate_growth_pct(&window, since_ms) else {
                continue;
            };
            if change_pct <= settings.min_growth_pct {
                continue;
            }

            tracing::info!(
                %symbol,
                change_pct,
                daily_price_change_pct = daily.price_change_pct,
                daily_volume = daily.volume,
                "Open interest spike detected"
            );

            self.cooldown.block(symbol.clone(), cooldown);
            let spike = OiSpike::new(symbol, change_pct, self.exchange, self.market_type, daily);
            tasks.push(self.dispatch(spike, &settings));
        }

        set_gauge(GaugeMetric::CooledDownSymbols, self.cooldown.len() as f64);
        record_latency(LatencyMetric::DetectionTick, start.elapsed());

        let sent = tasks.len();
        if sent == 0 {
            return 0;
        }

        let mut delivered = 0;
        for result in join_all(tasks).await {
            match result {
                Ok(true) => delivered += 1,
                Ok(false) => {}
                Err(e) => tracing::error!(error = %e, "Notification task panicked"),
            }
        }

        increment_counter(CounterMetric::AlertsSent, delivered as u64);
        tracing::info!(sent, delivered, "Sent signals");
        sent
    }

    /// Spawn delivery of one alert; the task reports whether it succeeded
    fn dispatch(&self, spike: OiSpike, settings: &ScreenerSettings) -> JoinHandle<bool> {
        let notifier = self.notifier.clone();
        let bot_token = settings.bot_token.clone();
        let chat_id = settings.chat_id.clone();

        tokio::spawn(async move {
            let text = create_text(&spike);
            match notifier.send_message(&bot_token, &chat_id, &text).await {
                Ok(()) => true,
                Err(e) => {
                    increment_counter(CounterMetric::NotificationFailures, 1);
                    tracing::error!(symbol = %spike.symbol, error = %e, "Failed to send alert");
                    false
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{DailyTickerStat, OiItem, TickerDailyMap};
    use crate::settings::SettingsHandle;
    use crate::window::WindowMap;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StaticSource {
        windows: Mutex<WindowMap>,
        tickers: Mutex<TickerDailyMap>,
    }

    #[async_trait]
    impl MarketDataSource for StaticSource {
        async fn open_interest_snapshot(&self) -> WindowMap {
            self.windows.lock().unwrap().clone()
        }

        async fn ticker_daily_snapshot(&self) -> TickerDailyMap {
            self.tickers.lock().unwrap().clone()
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_message(
            &self,
            _bot_token: &str,
            _chat_id: &str,
            text: &str,
        ) -> anyhow::Result<()> {
            if let Some(symbol) = &self.fail_on {
                if text.contains(symbol.as_str()) {
                    anyhow::bail!("delivery failed");
                }
            }
            self.messages.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn settings(min_growth_pct: f64) -> ScreenerSettings {
        ScreenerSettings {
            min_growth_pct,
            lookback_secs: 120,
            cooldown_secs: 600,
            ready: true,
            bot_token: "token".into(),
            chat_id: "chat".into(),
        }
    }

    fn rising_window(from: f64, to: f64) -> Vec<OiItem> {
        let now = Utc::now().timestamp_millis();
        vec![
            OiItem::new(now - 30_000, from),
            OiItem::new(now - 20_000, (from + to) / 2.0),
            OiItem::new(now - 10_000, to),
        ]
    }

    fn daily() -> DailyTickerStat {
        DailyTickerStat {
            price_change_pct: 3.5,
            volume: 12_000_000.0,
        }
    }

    struct Fixture {
        source: Arc<StaticSource>,
        notifier: Arc<RecordingNotifier>,
        handle: SettingsHandle,
        consumer: Consumer,
    }

    fn fixture(settings: ScreenerSettings, notifier: RecordingNotifier) -> Fixture {
        let source = Arc::new(StaticSource::default());
        let notifier = Arc::new(notifier);
        let handle = SettingsHandle::new(settings);
        let consumer = Consumer::new(
            source.clone(),
            notifier.clone(),
            handle.subscribe(),
            Exchange::Binance,
            MarketType::Futures,
        );
        Fixture {
            source,
            notifier,
            handle,
            consumer,
        }
    }

    fn add_symbol(source: &StaticSource, symbol: &str, window: Vec<OiItem>) {
        source.windows.lock().unwrap().insert(symbol.to_string(), window);
        source.tickers.lock().unwrap().insert(symbol.to_string(), daily());
    }

    #[tokio::test]
    async fn test_alerts_once_per_cooldown() {
        let mut f = fixture(settings(25.0), RecordingNotifier::default());
        add_symbol(&f.source, "XYZUSDT", rising_window(1000.0, 1300.0));

        assert_eq!(f.consumer.tick().await, 1);
        assert_eq!(f.consumer.tick().await, 0);
        assert_eq!(f.consumer.tick().await, 0);

        let messages = f.notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("XYZUSDT"));
        assert!(messages[0].contains("30.00%"));
    }

    #[tokio::test]
    async fn test_below_threshold_not_alerted() {
        let mut f = fixture(settings(50.0), RecordingNotifier::default());
        add_symbol(&f.source, "XYZUSDT", rising_window(1000.0, 1300.0));

        assert_eq!(f.consumer.tick().await, 0);
        assert!(f.consumer.cooldown.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_is_strict() {
        let mut f = fixture(settings(50.0), RecordingNotifier::default());
        let now = Utc::now().timestamp_millis();
        add_symbol(
            &f.source,
            "XYZUSDT",
            vec![OiItem::new(now - 1_000, 100.0), OiItem::new(now, 150.0)],
        );

        assert_eq!(f.consumer.tick().await, 0);
    }

    #[tokio::test]
    async fn test_not_ready_skips_everything() {
        let mut not_ready = settings(1.0);
        not_ready.ready = false;
        let mut f = fixture(not_ready, RecordingNotifier::default());
        add_symbol(&f.source, "XYZUSDT", rising_window(1000.0, 2000.0));

        assert_eq!(f.consumer.tick().await, 0);
        assert!(f.consumer.cooldown.is_empty());
        assert!(f.notifier.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_daily_ticker_skipped() {
        let mut f = fixture(settings(10.0), RecordingNotifier::default());
        f.source
            .windows
            .lock()
            .unwrap()
            .insert("NODAILY".to_string(), rising_window(100.0, 200.0));

        assert_eq!(f.consumer.tick().await, 0);
        // Picked up once the ticker cache has it
        f.source.tickers.lock().unwrap().insert("NODAILY".to_string(), daily());
        assert_eq!(f.consumer.tick().await, 1);
    }

    #[tokio::test]
    async fn test_settings_hot_swap_applies_next_tick() {
        let mut f = fixture(settings(50.0), RecordingNotifier::default());
        add_symbol(&f.source, "XYZUSDT", rising_window(1000.0, 1300.0));

        assert_eq!(f.consumer.tick().await, 0);
        f.handle.update(settings(25.0)).unwrap();
        assert_eq!(f.consumer.tick().await, 1);
    }

    #[tokio::test]
    async fn test_hot_swap_to_not_ready_stops_alerts() {
        let mut f = fixture(settings(10.0), RecordingNotifier::default());
        let mut disabled = settings(10.0);
        disabled.ready = false;
        f.handle.update(disabled).unwrap();
        add_symbol(&f.source, "XYZUSDT", rising_window(1000.0, 1300.0));

        assert_eq!(f.consumer.tick().await, 0);
    }

    #[tokio::test]
    async fn test_failed_notification_does_not_block_others() {
        let notifier = RecordingNotifier {
            fail_on: Some("BADUSDT".to_string()),
            ..Default::default()
        };
        let mut f = fixture(settings(10.0), notifier);
        add_symbol(&f.source, "BADUSDT", rising_window(100.0, 200.0));
        add_symbol(&f.source, "GOODUSDT", rising_window(100.0, 200.0));

        assert_eq!(f.consumer.tick().await, 2);
        let messages = f.notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("GOODUSDT"));
        // Cooldown armed even when delivery failed
        assert!(f.consumer.cooldown.is_blocked(&"BADUSDT".to_string()));
    }

    #[tokio::test]
    async fn test_stale_readings_outside_lookback_ignored() {
        let mut f = fixture(settings(10.0), RecordingNotifier::default());
        let now = Utc::now().timestamp_millis();
        add_symbol(
            &f.source,
            "OLDUSDT",
            vec![OiItem::new(now - 600_000, 100.0), OiItem::new(now - 1_000, 200.0)],
        );

        assert_eq!(f.consumer.tick().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_expiry_allows_new_alert() {
        let mut short = settings(10.0);
        short.cooldown_secs = 5;
        let mut f = fixture(short, RecordingNotifier::default());
        add_symbol(&f.source, "XYZUSDT", rising_window(100.0, 200.0));

        assert_eq!(f.consumer.tick().await, 1);
        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(f.consumer.tick().await, 0);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(f.consumer.tick().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_flag() {
        let mut f = fixture(settings(10.0), RecordingNotifier::default());
        add_symbol(&f.source, "XYZUSDT", rising_window(100.0, 200.0));
        let flag = f.consumer.run_flag();

        let handle = tokio::spawn(async move {
            f.consumer.run().await;
            f.notifier
        });
        tokio::time::sleep(Duration::from_secs(3)).await;
        flag.stop();

        let notifier = handle.await.unwrap();
        assert_eq!(notifier.messages.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_source_is_object_safe() {
        let _source: Arc<dyn MarketDataSource> = Arc::new(StaticSource {
            windows: Mutex::new(HashMap::new()),
            tickers: Mutex::new(HashMap::new()),
        });
    }
}
