//! Exchange access module
//!
//! Capability flags for supported exchanges and the async client surface
//! used by the acquisition loop.

mod binance;
mod types;

pub use binance::{BinanceConfig, BinanceConnector, BinanceFuturesClient};
pub use types::{DailyTickerStat, ExchangeError, OiItem, OiSnapshot, TickerDailyMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Supported derivatives exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Binance,
    Bybit,
    Okx,
    Bitget,
    Gate,
    Bingx,
    Aster,
    Mexc,
}

impl Exchange {
    /// Lowercase exchange identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Binance => "binance",
            Exchange::Bybit => "bybit",
            Exchange::Okx => "okx",
            Exchange::Bitget => "bitget",
            Exchange::Gate => "gate",
            Exchange::Bingx => "bingx",
            Exchange::Aster => "aster",
            Exchange::Mexc => "mexc",
        }
    }

    /// Whether open interest for every symbol can be fetched in one request
    pub fn has_bulk_open_interest(&self) -> bool {
        !matches!(self, Exchange::Binance | Exchange::Bingx | Exchange::Gate)
    }

    /// Whether open interest is reported in contracts and must be divided by price
    pub fn reports_contracts(&self) -> bool {
        matches!(self, Exchange::Bingx | Exchange::Aster)
    }

    /// Link to the trading page for a symbol, if known
    pub fn trade_url(&self, market_type: MarketType, symbol: &str) -> Option<String> {
        match (self, market_type) {
            (Exchange::Binance, MarketType::Futures) => {
                Some(format!("https://www.binance.com/en/futures/{symbol}"))
            }
            (Exchange::Binance, MarketType::Spot) => {
                Some(format!("https://www.binance.com/en/trade/{symbol}?type=spot"))
            }
            (Exchange::Bybit, MarketType::Futures) => {
                Some(format!("https://www.bybit.com/trade/usdt/{symbol}"))
            }
            (Exchange::Bybit, MarketType::Spot) => {
                let base = symbol.strip_suffix("USDT")?;
                Some(format!("https://www.bybit.com/en/trade/spot/{base}/USDT"))
            }
            (Exchange::Bingx, MarketType::Futures) => {
                Some(format!("https://bingx.com/en/perpetual/{symbol}"))
            }
            (Exchange::Aster, MarketType::Futures) => {
                Some(format!("https://www.asterdex.com/en/futures/v1/{symbol}"))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Market type the screener watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Spot,
    #[default]
    Futures,
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketType::Spot => f.write_str("spot"),
            MarketType::Futures => f.write_str("futures"),
        }
    }
}

/// Async capability surface of an exchange REST client
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Fetch open interest for every symbol in one request
    async fn open_interest_all(&self) -> Result<OiSnapshot, ExchangeError>;

    /// Fetch open interest for a single symbol; `None` when the exchange returns nothing
    async fn open_interest(&self, symbol: &str) -> Result<Option<OiItem>, ExchangeError>;

    /// List tradable symbols split into batches of at most `batch_size`
    async fn tickers_batched(&self, batch_size: usize) -> Result<Vec<Vec<String>>, ExchangeError>;

    /// Latest traded price for every symbol
    async fn last_prices(&self) -> Result<HashMap<String, f64>, ExchangeError>;

    /// 24 hour statistics for every symbol
    async fn ticker_24hr(&self) -> Result<TickerDailyMap, ExchangeError>;
}

/// Creates scoped exchange clients
///
/// A client lives for one acquisition iteration and releases its
/// connections when dropped.
#[async_trait]
pub trait ExchangeConnector: Send + Sync {
    type Client: ExchangeClient;

    /// Exchange this connector talks to
    fn exchange(&self) -> Exchange;

    /// Open a new client
    async fn connect(&self) -> Result<Self::Client, ExchangeError>;
}

/// Split symbols into consecutive chunks of at most `size` elements
pub fn chunk_symbols(symbols: Vec<String>, size: usize) -> Vec<Vec<String>> {
    let size = size.max(1);
    symbols.chunks(size).map(|c| c.to_vec()).collect()
}
