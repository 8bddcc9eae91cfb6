//! Exchange data types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::Exchange;

/// A single open interest reading for one symbol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OiItem {
    /// Observation time (unix milliseconds)
    pub timestamp: i64,
    /// Open interest value
    pub value: f64,
}

impl OiItem {
    /// Create a new open interest reading
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// 24 hour ticker statistics for one symbol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTickerStat {
    /// Price change over the last 24 hours, in percent
    pub price_change_pct: f64,
    /// Quote volume over the last 24 hours
    pub volume: f64,
}

/// Open interest keyed by symbol, one reading per symbol
pub type OiSnapshot = HashMap<String, OiItem>;

/// Daily ticker statistics keyed by symbol
pub type TickerDailyMap = HashMap<String, DailyTickerStat>;

/// Exchange client errors
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Transport level failure (connect, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Exchange answered with a non-success status
    #[error("API error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    /// Response payload could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),
    /// The exchange has no endpoint for this operation
    #[error("Operation not supported by {exchange}: {operation}")]
    Unsupported {
        exchange: Exchange,
        operation: &'static str,
    },
    /// No REST client is available for this exchange
    #[error("No client available for exchange {0}")]
    UnsupportedExchange(Exchange),
}

impl ExchangeError {
    /// Whether the error was caused by a request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExchangeError::Http(e) if e.is_timeout())
    }
}
