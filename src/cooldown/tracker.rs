//! Expiring per-key block map

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

/// Tracks keys that are blocked until a deadline
///
/// Expiry is checked lazily on read. Expired entries are dropped when read
/// and by [`CooldownTracker::purge_expired`].
#[derive(Debug)]
pub struct CooldownTracker<K> {
    deadlines: HashMap<K, Instant>,
}

impl<K: Eq + Hash> CooldownTracker<K> {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self {
            deadlines: HashMap::new(),
        }
    }

    /// Whether `key` is currently blocked
    pub fn is_blocked(&mut self, key: &K) -> bool {
        self.is_blocked_at(key, Instant::now())
    }

    /// Whether `key` is blocked at `now`
    pub fn is_blocked_at(&mut self, key: &K, now: Instant) -> bool {
        match self.deadlines.get(key) {
            Some(deadline) if *deadline > now => true,
            Some(_) => {
                self.deadlines.remove(key);
                false
            }
            None => false,
        }
    }

    /// Block `key` for `duration` from now, replacing any existing deadline
    pub fn block(&mut self, key: K, duration: Duration) {
        self.block_at(key, duration, Instant::now());
    }

    /// Block `key` until `now + duration`, replacing any existing deadline
    pub fn block_at(&mut self, key: K, duration: Duration, now: Instant) {
        self.deadlines.insert(key, now + duration);
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// Drop every entry expired at `now`
    pub fn purge_expired_at(&mut self, now: Instant) -> usize {
        let before = self.deadlines.len();
        self.deadlines.retain(|_, deadline| *deadline > now);
        before - self.deadlines.len()
    }

    /// Number of entries, expired or not
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

impl<K: Eq + Hash> Default for CooldownTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}
