//! Per-symbol sliding window of open interest readings

use crate::exchange::{OiItem, OiSnapshot};
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// How long readings are kept, independent of the detection lookback
pub const RETENTION_HORIZON: Duration = Duration::from_secs(15 * 60);

/// Readings for every tracked symbol, oldest first
pub type WindowMap = HashMap<String, Vec<OiItem>>;

/// Sliding window store guarded by its own lock
///
/// Readers get a full copy taken under the read guard, so a snapshot never
/// observes a partially applied merge.
pub struct SlidingWindowStore {
    retention: Duration,
    windows: RwLock<WindowMap>,
}

impl SlidingWindowStore {
    /// Create an empty store with the standard 15 minute retention
    pub fn new() -> Self {
        Self::with_retention(RETENTION_HORIZON)
    }

    /// Create an empty store with a custom retention horizon
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            retention,
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Retention horizon of this store
    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Merge a snapshot taken now
    pub async fn merge(&self, snapshot: OiSnapshot) {
        self.merge_at(snapshot, Utc::now().timestamp_millis()).await;
    }

    /// Merge a snapshot, pruning relative to `now_ms`
    ///
    /// Only symbols present in the snapshot are pruned and extended. Symbols
    /// missing from it keep their existing readings.
    pub async fn merge_at(&self, snapshot: OiSnapshot, now_ms: i64) {
        let threshold = now_ms - self.retention.as_millis() as i64;
        let mut windows = self.windows.write().await;

        for (symbol, item) in snapshot {
            let window = windows.entry(symbol).or_default();
            window.retain(|el| el.timestamp >= threshold);
            window.push(item);
        }
    }

    /// Copy of the current store state
    pub async fn snapshot(&self) -> WindowMap {
        self.windows.read().await.clone()
    }

    /// Number of tracked symbols
    pub async fn len(&self) -> usize {
        self.windows.read().await.len()
    }

    /// Whether no symbol has been merged yet
    pub async fn is_empty(&self) -> bool {
        self.windows.read().await.is_empty()
    }
}

impl Default for SlidingWindowStore {
    fn default() -> Self {
        Self::new()
    }
}
