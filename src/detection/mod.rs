//! Spike detection module
//!
//! Turns open interest windows into alerts, at most one per symbol per
//! cooldown period.

mod consumer;
mod growth;
mod types;

pub use consumer::{Consumer, TICK_INTERVAL};
pub use growth::calculate_growth_pct;
pub use types::OiSpike;
