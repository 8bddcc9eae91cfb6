//! Cooperative shutdown flag shared by the long-running loops

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Longest single sleep step, bounding how long a stop request can go unnoticed
pub const SLEEP_STEP: Duration = Duration::from_secs(1);

/// Shared running flag; clones observe the same state
#[derive(Debug, Clone)]
pub struct RunFlag {
    running: Arc<AtomicBool>,
}

impl RunFlag {
    /// Create a flag in the running state
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request every loop holding this flag to stop
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Sleep for `duration` in steps of at most one second
    ///
    /// Returns early once the flag is cleared.
    pub async fn sleep(&self, duration: Duration) {
        let mut remaining = duration;
        while !remaining.is_zero() {
            if !self.is_running() {
                return;
            }
            let step = remaining.min(SLEEP_STEP);
            tokio::time::sleep(step).await;
            remaining -= step;
        }
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}
