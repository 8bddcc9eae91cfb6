//! Prometheus metrics

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// One open interest acquisition iteration
    Poll,
    /// One daily ticker refresh
    TickerRefresh,
    /// One detection pass, excluding notification delivery
    DetectionTick,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Symbols merged into the window store
    SymbolsMerged,
    /// Per-symbol open interest requests that failed
    FetchFailures,
    /// Per-symbol open interest requests that returned nothing
    EmptyResponses,
    /// Acquisition iterations that failed as a whole
    IterationFailures,
    /// Daily ticker refreshes that failed
    TickerRefreshFailures,
    /// Alerts delivered
    AlertsSent,
    /// Alerts the notifier failed to deliver
    NotificationFailures,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Symbols with an open interest window
    TrackedSymbols,
    /// Symbols currently held in the cooldown tracker
    CooledDownSymbols,
}

fn latency_name(metric: LatencyMetric) -> &'static str {
    match metric {
        LatencyMetric::Poll => "oiscreener_poll_latency_ms",
        LatencyMetric::TickerRefresh => "oiscreener_ticker_refresh_latency_ms",
        LatencyMetric::DetectionTick => "oiscreener_detection_tick_latency_ms",
    }
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::SymbolsMerged => "oiscreener_symbols_merged_total",
        CounterMetric::FetchFailures => "oiscreener_fetch_failures_total",
        CounterMetric::EmptyResponses => "oiscreener_empty_responses_total",
        CounterMetric::IterationFailures => "oiscreener_iteration_failures_total",
        CounterMetric::TickerRefreshFailures => "oiscreener_ticker_refresh_failures_total",
        CounterMetric::AlertsSent => "oiscreener_alerts_sent_total",
        CounterMetric::NotificationFailures => "oiscreener_notification_failures_total",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::TrackedSymbols => "oiscreener_tracked_symbols",
        GaugeMetric::CooledDownSymbols => "oiscreener_cooled_down_symbols",
    }
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    ::metrics::histogram!(latency_name(metric)).record(duration.as_secs_f64() * 1000.0);
}

/// Increment a counter
pub fn increment_counter(metric: CounterMetric, value: u64) {
    ::metrics::counter!(counter_name(metric)).increment(value);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(gauge_name(metric)).set(value);
}

/// Serve metrics in Prometheus text format on `port`
pub fn init_metrics_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus metrics exporter listening");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        assert!(latency_name(LatencyMetric::Poll).starts_with("oiscreener_"));
        assert!(counter_name(CounterMetric::AlertsSent).ends_with("_total"));
        assert_eq!(gauge_name(GaugeMetric::TrackedSymbols), "oiscreener_tracked_symbols");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_latency(LatencyMetric::DetectionTick, Duration::from_millis(3));
        increment_counter(CounterMetric::FetchFailures, 1);
        set_gauge(GaugeMetric::CooledDownSymbols, 2.0);
    }
}
