//! Sliding window module
//!
//! Bounded recent history of open interest readings per symbol

mod store;

pub use store::{SlidingWindowStore, WindowMap, RETENTION_HORIZON};
