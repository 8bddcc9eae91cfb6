//! Detection types

use crate::exchange::{DailyTickerStat, Exchange, MarketType};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A detected open interest spike, ready to be announced
#[derive(Debug, Clone, Serialize)]
pub struct OiSpike {
    /// Symbol the spike was detected on
    pub symbol: String,
    /// Open interest growth within the lookback, in percent
    pub change_pct: f64,
    pub exchange: Exchange,
    pub market_type: MarketType,
    /// Price change over the last 24 hours, in percent
    pub daily_price_change_pct: f64,
    /// Quote volume over the last 24 hours
    pub daily_volume: f64,
    pub detected_at: DateTime<Utc>,
}

impl OiSpike {
    /// Create a spike stamped with the current time
    pub fn new(
        symbol: impl Into<String>,
        change_pct: f64,
        exchange: Exchange,
        market_type: MarketType,
        daily: DailyTickerStat,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            change_pct,
            exchange,
            market_type,
            daily_price_change_pct: daily.price_change_pct,
            daily_volume: daily.volume,
            detected_at: Utc::now(),
        }
    }
}
