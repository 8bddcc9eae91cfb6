//! Per-exchange request tuning
//!
//! Poll interval, chunk size and chunk pause are looked up per exchange with
//! a declared default for exchanges that have no override.

use crate::config::AcquisitionConfig;
use crate::exchange::Exchange;
use std::collections::HashMap;
use std::time::Duration;

/// Exchange quirk table used by the producer
#[derive(Debug, Clone)]
pub struct AcquisitionTuning {
    pub poll_interval: HashMap<Exchange, Duration>,
    pub default_poll_interval: Duration,
    pub chunk_size: HashMap<Exchange, usize>,
    pub default_chunk_size: usize,
    pub chunk_interval: HashMap<Exchange, Duration>,
    pub default_chunk_interval: Duration,
    /// Interval between daily ticker cache refreshes
    pub ticker_refresh_interval: Duration,
}

impl Default for AcquisitionTuning {
    fn default() -> Self {
        Self {
            poll_interval: HashMap::from([(Exchange::Aster, Duration::from_secs(20))]),
            default_poll_interval: Duration::from_secs(5),
            chunk_size: HashMap::from([(Exchange::Binance, 20), (Exchange::Gate, 7)]),
            default_chunk_size: 20,
            chunk_interval: HashMap::new(),
            default_chunk_interval: Duration::from_millis(330),
            ticker_refresh_interval: Duration::from_secs(5),
        }
    }
}

impl AcquisitionTuning {
    /// Built-in table with the config file overrides applied on top
    pub fn from_config(config: &AcquisitionConfig) -> Self {
        let mut tuning = Self::default();

        if let Some(secs) = config.default_poll_interval_secs {
            tuning.default_poll_interval = Duration::from_secs(secs);
        }
        if let Some(size) = config.default_chunk_size {
            tuning.default_chunk_size = size;
        }
        if let Some(ms) = config.default_chunk_interval_ms {
            tuning.default_chunk_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = config.ticker_refresh_interval_secs {
            tuning.ticker_refresh_interval = Duration::from_secs(secs);
        }

        tuning.poll_interval.extend(
            config
                .poll_interval_secs
                .iter()
                .map(|(ex, secs)| (*ex, Duration::from_secs(*secs))),
        );
        tuning.chunk_size.extend(config.chunk_size.iter().map(|(ex, n)| (*ex, *n)));
        tuning.chunk_interval.extend(
            config
                .chunk_interval_ms
                .iter()
                .map(|(ex, ms)| (*ex, Duration::from_millis(*ms))),
        );

        tuning
    }

    pub fn poll_interval_for(&self, exchange: Exchange) -> Duration {
        self.poll_interval
            .get(&exchange)
            .copied()
            .unwrap_or(self.default_poll_interval)
    }

    pub fn chunk_size_for(&self, exchange: Exchange) -> usize {
        self.chunk_size
            .get(&exchange)
            .copied()
            .unwrap_or(self.default_chunk_size)
    }

    pub fn chunk_interval_for(&self, exchange: Exchange) -> Duration {
        self.chunk_interval
            .get(&exchange)
            .copied()
            .unwrap_or(self.default_chunk_interval)
    }
}
