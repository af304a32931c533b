//! Sliding-window rate limiting over session storage.
//!
//! Each key stores the timestamps of its recent *admitted* attempts as a JSON
//! array under `rate_limit_{key}`. Stale entries are dropped lazily on each
//! check. Rejected attempts are never recorded, so probing at the limit does
//! not extend the window or grow the list.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::fallback;
use crate::storage::{Scope, Storage, StorageError};

/// Prefix for rate-limit keys in session storage.
pub const RATE_LIMIT_PREFIX: &str = "rate_limit_";

/// Attempts allowed per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_attempts: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    #[must_use]
    pub const fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
        }
    }

    /// Admin login: 5 attempts per 15 minutes.
    #[must_use]
    pub const fn login() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::login()
    }
}

/// Keyed sliding-window limiter.
#[derive(Clone)]
pub struct RateLimiter {
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    #[must_use]
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Admit or reject one attempt for `key`.
    ///
    /// Returns `false`, recording nothing, when `max_attempts` admitted
    /// attempts already fall inside `window`. Otherwise records this attempt
    /// and returns `true`. A failed write is logged; the attempt is still
    /// admitted.
    pub fn check_and_record(&self, key: &str, max_attempts: u32, window: Duration) -> bool {
        let storage_key = storage_key(key);
        let now = self.clock.now_millis();
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);

        let mut attempts = self.read_attempts(&storage_key);
        attempts.retain(|&at| now.saturating_sub(at) < window_ms);

        if attempts.len() >= usize::try_from(max_attempts).unwrap_or(usize::MAX) {
            tracing::warn!(key, attempts = attempts.len(), max_attempts, "Rate limit reached");
            return false;
        }

        attempts.push(now);
        if let Err(e) = self.write_attempts(&storage_key, &attempts) {
            tracing::error!(key, error = %e, "Failed to record rate-limit attempt");
        }
        true
    }

    /// [`RateLimiter::check_and_record`] with a preset.
    pub fn check(&self, key: &str, config: RateLimitConfig) -> bool {
        self.check_and_record(key, config.max_attempts, config.window)
    }

    /// Forget every recorded attempt for `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    pub fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.storage.delete(Scope::Session, &storage_key(key))
    }

    fn read_attempts(&self, storage_key: &str) -> Vec<i64> {
        let parsed = self
            .storage
            .get(Scope::Session, storage_key)
            .and_then(|raw| match raw {
                Some(raw) => serde_json::from_str(&raw).map_err(StorageError::from),
                None => Ok(Vec::new()),
            });
        fallback::or_default(parsed, "rate_limit.read")
    }

    fn write_attempts(&self, storage_key: &str, attempts: &[i64]) -> Result<(), StorageError> {
        let json = serde_json::to_string(attempts)?;
        self.storage.set(Scope::Session, storage_key, &json)
    }
}

fn storage_key(key: &str) -> String {
    format!("{RATE_LIMIT_PREFIX}{key}")
}
