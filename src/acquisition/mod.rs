//! Acquisition module
//!
//! Keeps the open interest windows and daily ticker statistics fresh

mod producer;
mod tuning;

pub use producer::{normalize_contracts, Producer};
pub use tuning::AcquisitionTuning;

use crate::exchange::TickerDailyMap;
use crate::window::WindowMap;
use async_trait::async_trait;

/// Read-only access to the data collected by the acquisition loop
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Consistent copy of every symbol's open interest window
    async fn open_interest_snapshot(&self) -> WindowMap;

    /// Consistent copy of the daily ticker cache
    async fn ticker_daily_snapshot(&self) -> TickerDailyMap;
}
