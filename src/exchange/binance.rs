//! Binance USDⓈ-M futures REST client
//!
//! Binance has no endpoint returning open interest for every symbol, so the
//! acquisition loop queries `/fapi/v1/openInterest` per symbol in chunks.

use super::{
    chunk_symbols, DailyTickerStat, Exchange, ExchangeClient, ExchangeConnector, ExchangeError,
    OiItem, OiSnapshot, TickerDailyMap,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Binance USDⓈ-M futures API base URL
pub const BINANCE_FUTURES_URL: &str = "https://fapi.binance.com";

/// Configuration for the Binance client
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceConfig {
    /// Base URL for the futures API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    BINANCE_FUTURES_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Opens a fresh [`BinanceFuturesClient`] per acquisition iteration
#[derive(Debug, Clone)]
pub struct BinanceConnector {
    config: BinanceConfig,
}

impl BinanceConnector {
    /// Create a connector with the given configuration
    pub fn new(config: BinanceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ExchangeConnector for BinanceConnector {
    type Client = BinanceFuturesClient;

    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    async fn connect(&self) -> Result<Self::Client, ExchangeError> {
        BinanceFuturesClient::with_config(self.config.clone())
    }
}

/// Client for the Binance USDⓈ-M futures REST API
pub struct BinanceFuturesClient {
    config: BinanceConfig,
    client: Client,
}

impl BinanceFuturesClient {
    /// Create a client with custom configuration
    pub fn with_config(config: BinanceConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ExchangeError> {
        let url = format!("{}{}", self.config.base_url, path);

        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    /// Symbols of perpetual contracts currently trading
    async fn tradable_symbols(&self) -> Result<Vec<String>, ExchangeError> {
        let info: ExchangeInfo = self.get_json("/fapi/v1/exchangeInfo", &[]).await?;
        Ok(tradable_perpetuals(info))
    }
}

#[async_trait]
impl ExchangeClient for BinanceFuturesClient {
    async fn open_interest_all(&self) -> Result<OiSnapshot, ExchangeError> {
        Err(ExchangeError::Unsupported {
            exchange: Exchange::Binance,
            operation: "bulk open interest",
        })
    }

    async fn open_interest(&self, symbol: &str) -> Result<Option<OiItem>, ExchangeError> {
        let raw: RawOpenInterest = self
            .get_json("/fapi/v1/openInterest", &[("symbol", symbol)])
            .await?;
        raw.into_item()
    }

    async fn tickers_batched(&self, batch_size: usize) -> Result<Vec<Vec<String>>, ExchangeError> {
        let symbols = self.tradable_symbols().await?;
        tracing::debug!(symbols = symbols.len(), batch_size, "Listed Binance perpetuals");
        Ok(chunk_symbols(symbols, batch_size))
    }

    async fn last_prices(&self) -> Result<HashMap<String, f64>, ExchangeError> {
        let raw: Vec<RawPrice> = self.get_json("/fapi/v1/ticker/price", &[]).await?;
        Ok(raw
            .into_iter()
            .filter_map(|p| p.price.parse::<f64>().ok().map(|price| (p.symbol, price)))
            .collect())
    }

    async fn ticker_24hr(&self) -> Result<TickerDailyMap, ExchangeError> {
        let raw: Vec<RawTicker24hr> = self.get_json("/fapi/v1/ticker/24hr", &[]).await?;
        Ok(raw.into_iter().filter_map(RawTicker24hr::into_entry).collect())
    }
}

/// Exchange info response (only the fields we need)
#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    status: String,
    #[serde(default)]
    contract_type: String,
}

fn tradable_perpetuals(info: ExchangeInfo) -> Vec<String> {
    info.symbols
        .into_iter()
        .filter(|s| s.status == "TRADING" && s.contract_type == "PERPETUAL")
        .map(|s| s.symbol)
        .collect()
}

/// Open interest response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOpenInterest {
    #[serde(default)]
    open_interest: Option<String>,
    time: i64,
}

impl RawOpenInterest {
    fn into_item(self) -> Result<Option<OiItem>, ExchangeError> {
        let Some(raw) = self.open_interest.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let value = raw
            .parse::<f64>()
            .map_err(|e| ExchangeError::Parse(format!("openInterest {raw:?}: {e}")))?;
        Ok(Some(OiItem::new(self.time, value)))
    }
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    symbol: String,
    price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTicker24hr {
    symbol: String,
    price_change_percent: String,
    quote_volume: String,
}

impl RawTicker24hr {
    fn into_entry(self) -> Option<(String, DailyTickerStat)> {
        let price_change_pct = self.price_change_percent.parse().ok()?;
        let volume = self.quote_volume.parse().ok()?;
        Some((
            self.symbol,
            DailyTickerStat {
                price_change_pct,
                volume,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BinanceConfig::default();
        assert_eq!(config.base_url, "https://fapi.binance.com");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_parse_open_interest() {
        let json = r#"{"openInterest":"10659.509","symbol":"BTCUSDT","time":1589437530011}"#;
        let raw: RawOpenInterest = serde_json::from_str(json).unwrap();
        let item = raw.into_item().unwrap().unwrap();
        assert_eq!(item.timestamp, 1589437530011);
        assert!((item.value - 10659.509).abs() < 1e-9);
    }

    #[test]
    fn test_parse_open_interest_empty() {
        let json = r#"{"openInterest":"","symbol":"BTCUSDT","time":1589437530011}"#;
        let raw: RawOpenInterest = serde_json::from_str(json).unwrap();
        assert!(raw.into_item().unwrap().is_none());
    }

    #[test]
    fn test_parse_open_interest_garbage() {
        let json = r#"{"openInterest":"abc","symbol":"BTCUSDT","time":1}"#;
        let raw: RawOpenInterest = serde_json::from_str(json).unwrap();
        assert!(matches!(raw.into_item(), Err(ExchangeError::Parse(_))));
    }

    #[test]
    fn test_tradable_perpetuals_filter() {
        let json = r#"{"symbols":[
            {"symbol":"BTCUSDT","status":"TRADING","contractType":"PERPETUAL"},
            {"symbol":"BTCUSDT_250328","status":"TRADING","contractType":"CURRENT_QUARTER"},
            {"symbol":"OLDUSDT","status":"SETTLING","contractType":"PERPETUAL"},
            {"symbol":"ETHUSDT","status":"TRADING","contractType":"PERPETUAL"}
        ]}"#;
        let info: ExchangeInfo = serde_json::from_str(json).unwrap();
        assert_eq!(tradable_perpetuals(info), vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[test]
    fn test_parse_ticker_24hr() {
        let json = r#"[
            {"symbol":"BTCUSDT","priceChangePercent":"-1.250","quoteVolume":"15000000.5","lastPrice":"42000"},
            {"symbol":"BAD","priceChangePercent":"n/a","quoteVolume":"1"}
        ]"#;
        let raw: Vec<RawTicker24hr> = serde_json::from_str(json).unwrap();
        let map: TickerDailyMap = raw.into_iter().filter_map(RawTicker24hr::into_entry).collect();
        assert_eq!(map.len(), 1);
        let btc = map["BTCUSDT"];
        assert_eq!(btc.price_change_pct, -1.25);
        assert_eq!(btc.volume, 15000000.5);
    }

    #[tokio::test]
    async fn test_bulk_open_interest_unsupported() {
        let client = BinanceFuturesClient::with_config(BinanceConfig::default()).unwrap();
        let result = client.open_interest_all().await;
        assert!(matches!(
            result,
            Err(ExchangeError::Unsupported {
                exchange: Exchange::Binance,
                ..
            })
        ));
    }
}
