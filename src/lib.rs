//! oi-screener: Open interest spike screener for derivatives exchanges
//!
//! This library provides the core components for:
//! - Open interest acquisition, bulk or chunked per symbol
//! - A bounded sliding window of readings per symbol
//! - Growth detection over a configurable lookback
//! - Per-symbol alert cooldown
//! - Telegram alert delivery
//! - Logging and Prometheus metrics

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod cooldown;
pub mod detection;
pub mod exchange;
pub mod notify;
pub mod settings;
pub mod shutdown;
pub mod telemetry;
pub mod window;
