//! Per-player submission rate limiting
//!
//! Attempt timestamps are stored per player and filtered to a rolling window
//! on every check. Storage failures fail open so a broken backend never locks
//! out a legitimate player.

use serde::{Deserialize, Serialize};

use super::validation::PlayerId;
use crate::platform::{KeyValueStore, StorageError};

/// Submissions allowed per player within [`WINDOW_MS`]
pub const MAX_ATTEMPTS_PER_WINDOW: usize = 100;
/// Rolling window length (one hour)
pub const WINDOW_MS: f64 = 60.0 * 60.0 * 1000.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Attempts {
    attempts: Vec<f64>,
    last_reset: f64,
}

/// Rolling-window limiter backed by a key-value store
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_attempts: usize,
    window_ms: f64,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(MAX_ATTEMPTS_PER_WINDOW, WINDOW_MS)
    }
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window_ms: f64) -> Self {
        Self {
            max_attempts,
            window_ms,
        }
    }

    fn key(player: &PlayerId) -> String {
        format!("score_save_attempts_{}", player)
    }

    /// Record an attempt at `now_ms`; false when the player is over the limit
    pub fn check(&self, store: &mut dyn KeyValueStore, player: &PlayerId, now_ms: f64) -> bool {
        match self.try_check(store, player, now_ms) {
            Ok(allowed) => allowed,
            Err(e) => {
                log::warn!("Rate limit storage failed, allowing attempt: {}", e);
                true
            }
        }
    }

    fn try_check(
        &self,
        store: &mut dyn KeyValueStore,
        player: &PlayerId,
        now_ms: f64,
    ) -> Result<bool, StorageError> {
        let key = Self::key(player);
        let mut record = match store.get(&key)? {
            Some(json) => serde_json::from_str::<Attempts>(&json).unwrap_or_default(),
            None => Attempts::default(),
        };

        record.attempts.retain(|&t| now_ms - t < self.window_ms);
        if record.attempts.len() >= self.max_attempts {
            return Ok(false);
        }

        record.attempts.push(now_ms);
        record.last_reset = now_ms;
        store.set(&key, &serde_json::to_string(&record)?)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("quota".into()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota".into()))
        }
        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_limit_within_window() {
        let mut store = MemoryStore::default();
        let player = PlayerId::parse("AB12").unwrap();
        let limiter = RateLimiter::new(3, 1000.0);
        assert!(limiter.check(&mut store, &player, 0.0));
        assert!(limiter.check(&mut store, &player, 10.0));
        assert!(limiter.check(&mut store, &player, 20.0));
        assert!(!limiter.check(&mut store, &player, 30.0));
        // Oldest attempt ages out
        assert!(limiter.check(&mut store, &player, 1000.0));
    }

    #[test]
    fn test_players_are_independent() {
        let mut store = MemoryStore::default();
        let a = PlayerId::parse("AAAA").unwrap();
        let b = PlayerId::parse("BBBB").unwrap();
        let limiter = RateLimiter::new(1, WINDOW_MS);
        assert!(limiter.check(&mut store, &a, 0.0));
        assert!(!limiter.check(&mut store, &a, 1.0));
        assert!(limiter.check(&mut store, &b, 1.0));
    }

    #[test]
    fn test_storage_failure_allows() {
        let player = PlayerId::parse("AB12").unwrap();
        let limiter = RateLimiter::new(0, WINDOW_MS);
        assert!(limiter.check(&mut BrokenStore, &player, 0.0));
    }

    #[test]
    fn test_stored_format() {
        let mut store = MemoryStore::default();
        let player = PlayerId::parse("AB12").unwrap();
        RateLimiter::default().check(&mut store, &player, 5.0);
        let json = store.get("score_save_attempts_AB12").unwrap().unwrap();
        assert!(json.contains("\"attempts\":[5.0]"));
        assert!(json.contains("\"lastReset\":5.0"));
    }
}
