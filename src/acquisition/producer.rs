//! Open interest producer
//!
//! Polls the exchange for a full-universe open interest snapshot, merges it
//! into the sliding window store and keeps a daily ticker cache fresh.

use super::{AcquisitionTuning, MarketDataSource};
use crate::exchange::{
    Exchange, ExchangeClient, ExchangeConnector, ExchangeError, OiSnapshot, TickerDailyMap,
};
use crate::shutdown::RunFlag;
use crate::telemetry::{
    increment_counter, record_latency, set_gauge, CounterMetric, GaugeMetric, LatencyMetric,
};
use crate::window::{SlidingWindowStore, WindowMap};
use async_trait::async_trait;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Acquisition loop owning the window store and the daily ticker cache
pub struct Producer<C: ExchangeConnector> {
    connector: C,
    exchange: Exchange,
    tuning: AcquisitionTuning,
    running: RunFlag,
    open_interest: SlidingWindowStore,
    ticker_daily: RwLock<TickerDailyMap>,
}

impl<C: ExchangeConnector + 'static> Producer<C> {
    /// Create a producer for the connector's exchange
    pub fn new(connector: C, tuning: AcquisitionTuning) -> Self {
        Self::with_run_flag(connector, tuning, RunFlag::new())
    }

    /// Create a producer sharing an existing run flag
    pub fn with_run_flag(connector: C, tuning: AcquisitionTuning, running: RunFlag) -> Self {
        let exchange = connector.exchange();
        Self {
            connector,
            exchange,
            tuning,
            running,
            open_interest: SlidingWindowStore::new(),
            ticker_daily: RwLock::new(HashMap::new()),
        }
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// Run the polling loop until stopped
    ///
    /// The daily ticker refresh runs as a separate task and is awaited on
    /// shutdown.
    pub async fn run(self: Arc<Self>) {
        let interval = self.tuning.poll_interval_for(self.exchange);
        tracing::info!(
            exchange = %self.exchange,
            interval_secs = interval.as_secs_f64(),
            "Producer started"
        );

        let ticker_task = tokio::spawn(self.clone().run_ticker_daily_loop());

        while self.running.is_running() {
            let start = Instant::now();
            match self.poll_once().await {
                Ok(merged) => {
                    let elapsed = start.elapsed();
                    record_latency(LatencyMetric::Poll, elapsed);
                    increment_counter(CounterMetric::SymbolsMerged, merged as u64);
                    set_gauge(GaugeMetric::TrackedSymbols, self.open_interest.len().await as f64);
                    tracing::debug!(
                        exchange = %self.exchange,
                        symbols = merged,
                        took_ms = elapsed.as_millis() as u64,
                        "Open interest fetched"
                    );
                }
                Err(e) if e.is_timeout() => {
                    increment_counter(CounterMetric::IterationFailures, 1);
                    tracing::error!(exchange = %self.exchange, error = %e, "Producer timeout");
                }
                Err(e) => {
                    increment_counter(CounterMetric::IterationFailures, 1);
                    tracing::error!(exchange = %self.exchange, error = %e, "Producer iteration failed");
                }
            }
            self.running.sleep(interval).await;
        }

        if let Err(e) = ticker_task.await {
            tracing::error!(error = %e, "Daily ticker task ended abnormally");
        }
        tracing::info!(exchange = %self.exchange, "Producer stopped");
    }

    /// Request both producer loops to stop
    pub fn stop(&self) {
        tracing::info!(exchange = %self.exchange, "Stopping producer");
        self.running.stop();
    }

    /// Copy of the collected open interest windows
    pub async fn fetch_collected_data(&self) -> WindowMap {
        self.open_interest.snapshot().await
    }

    /// Copy of the daily ticker cache
    pub async fn fetch_ticker_daily(&self) -> TickerDailyMap {
        self.ticker_daily.read().await.clone()
    }

    /// One acquisition iteration; returns the number of symbols merged
    async fn poll_once(&self) -> Result<usize, ExchangeError> {
        let snapshot = {
            let client = self.connector.connect().await?;
            let snapshot = self.fetch_open_interest_snapshot(&client).await?;
            self.normalize_open_interest_snapshot(&client, snapshot).await?
        };

        let merged = snapshot.len();
        self.open_interest.merge(snapshot).await;
        Ok(merged)
    }

    async fn fetch_open_interest_snapshot(
        &self,
        client: &C::Client,
    ) -> Result<OiSnapshot, ExchangeError> {
        if self.exchange.has_bulk_open_interest() {
            client.open_interest_all().await
        } else {
            self.fetch_open_interest_snapshot_batched(client).await
        }
    }

    /// Per-symbol requests, one concurrent chunk at a time
    ///
    /// A failed or empty response only drops that symbol.
    async fn fetch_open_interest_snapshot_batched(
        &self,
        client: &C::Client,
    ) -> Result<OiSnapshot, ExchangeError> {
        let chunk_size = self.tuning.chunk_size_for(self.exchange);
        let chunk_interval = self.tuning.chunk_interval_for(self.exchange);
        let chunks = client.tickers_batched(chunk_size).await?;

        let mut results = OiSnapshot::new();
        for chunk in chunks {
            if !self.running.is_running() {
                tracing::debug!(
                    exchange = %self.exchange,
                    symbols = results.len(),
                    "Stop requested, ending batch early"
                );
                break;
            }
            let responses = join_all(chunk.iter().map(|symbol| client.open_interest(symbol))).await;

            for (symbol, response) in chunk.into_iter().zip(responses) {
                match response {
                    Ok(Some(item)) => {
                        results.insert(symbol, item);
                    }
                    Ok(None) => {
                        increment_counter(CounterMetric::EmptyResponses, 1);
                        tracing::warn!(exchange = %self.exchange, %symbol, "Empty open interest");
                    }
                    Err(e) => {
                        increment_counter(CounterMetric::FetchFailures, 1);
                        tracing::error!(
                            exchange = %self.exchange,
                            %symbol,
                            error = %e,
                            "Failed to fetch open interest"
                        );
                    }
                }
            }

            self.running.sleep(chunk_interval).await;
        }

        Ok(results)
    }

    async fn normalize_open_interest_snapshot(
        &self,
        client: &C::Client,
        mut snapshot: OiSnapshot,
    ) -> Result<OiSnapshot, ExchangeError> {
        if self.exchange.reports_contracts() {
            let last_prices = client.last_prices().await?;
            normalize_contracts(&mut snapshot, &last_prices);
        }
        Ok(snapshot)
    }

    /// Replace the daily ticker cache with a fresh snapshot
    async fn refresh_ticker_daily(&self) -> Result<usize, ExchangeError> {
        let tickers = {
            let client = self.connector.connect().await?;
            client.ticker_24hr().await?
        };
        let count = tickers.len();
        *self.ticker_daily.write().await = tickers;
        Ok(count)
    }

    async fn run_ticker_daily_loop(self: Arc<Self>) {
        let interval = self.tuning.ticker_refresh_interval;
        while self.running.is_running() {
            let start = Instant::now();
            match self.refresh_ticker_daily().await {
                Ok(count) => {
                    record_latency(LatencyMetric::TickerRefresh, start.elapsed());
                    tracing::trace!(exchange = %self.exchange, symbols = count, "Daily tickers refreshed");
                }
                Err(e) => {
                    increment_counter(CounterMetric::TickerRefreshFailures, 1);
                    tracing::error!(
                        exchange = %self.exchange,
                        error = %e,
                        "Error while updating daily tickers"
                    );
                }
            }
            self.running.sleep(interval).await;
        }
    }
}

#[async_trait]
impl<C: ExchangeConnector + 'static> MarketDataSource for Producer<C> {
    async fn open_interest_snapshot(&self) -> WindowMap {
        self.fetch_collected_data().await
    }

    async fn ticker_daily_snapshot(&self) -> TickerDailyMap {
        self.fetch_ticker_daily().await
    }
}

/// Convert contract-denominated readings using the latest prices
///
/// Readings without a usable price, or whose quotient is not finite, are
/// kept as reported.
pub fn normalize_contracts(snapshot: &mut OiSnapshot, last_prices: &HashMap<String, f64>) {
    for (symbol, item) in snapshot.iter_mut() {
        let Some(price) = last_prices.get(symbol).copied().filter(|p| *p != 0.0) else {
            tracing::trace!(%symbol, "Missing last price, keeping open interest as-is");
            continue;
        };

        let normalized = item.value / price;
        if !normalized.is_finite() {
            tracing::debug!(%symbol, price, "Failed to normalize open interest, keeping as-is");
            continue;
        }
        item.value = normalized;
    }
}
