//! Per-user fixed-window rate limiting.
//!
//! The limiter bounds how many purchase attempts a user may make within a
//! recurring window. The check is increment-first: the per-user counter is
//! atomically incremented, the post-increment value is compared against the
//! configured maximum, and an over-limit increment is rolled back with a
//! compensating decrement. Checking before incrementing would let two
//! concurrent callers both observe "under limit" before either increments;
//! the increment-then-compare ordering closes that race, the same pattern
//! the inventory ledger uses.
//!
//! A consumed rate-limit token is never refunded when later purchase steps
//! fail: rate limiting bounds request volume, not successful purchases.

use crate::counter::CounterStore;
use crate::errors::CounterStoreResult;
use crate::types::UserId;
use std::sync::Arc;
use std::time::Duration;

const RATE_LIMIT_KEY_PREFIX: &str = "rate_limit:";

fn rate_limit_key(user_id: &UserId) -> String {
    format!("{RATE_LIMIT_KEY_PREFIX}{user_id}")
}

/// Configuration for the rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enforced. When disabled, every acquisition
    /// succeeds without touching the counter store.
    pub enabled: bool,
    /// Maximum number of requests allowed per window.
    pub max_requests: u32,
    /// Length of the window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 5,
            window: Duration::from_secs(1),
        }
    }
}

impl RateLimitConfig {
    /// A configuration with enforcement switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Per-user admission counter over a recurring window.
///
/// Cloning is cheap and shares the underlying store.
#[derive(Debug)]
pub struct RateLimiter<C> {
    store: Arc<C>,
    config: RateLimitConfig,
}

impl<C> Clone for RateLimiter<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<C: CounterStore> RateLimiter<C> {
    /// Creates a new rate limiter over the given counter store.
    pub fn new(store: Arc<C>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Attempts to consume one request token for `user_id`.
    ///
    /// Returns `true` if the request is within the window's budget. The
    /// first increment of a window attaches the window expiry to the key,
    /// best effort: a crash between the increment and the expiry could
    /// leave a key without a deadline, which still counts correctly and can
    /// be cleared with [`reset`].
    ///
    /// # Errors
    /// Returns an error if the counter store is unreachable; the caller
    /// must deny the request (fail-closed).
    ///
    /// [`reset`]: RateLimiter::reset
    pub async fn try_acquire(&self, user_id: &UserId) -> CounterStoreResult<bool> {
        if !self.config.enabled {
            return Ok(true);
        }

        let key = rate_limit_key(user_id);
        let count = self.store.incr(&key).await?;

        if count == 1 {
            // First request in this window: start the clock. Best effort only.
            if let Err(error) = self.store.expire(&key, self.config.window).await {
                tracing::warn!(user_id = %user_id, error = %error, "Failed to set rate-limit window expiry");
            }
        }

        if count > i64::from(self.config.max_requests) {
            // Roll back the over-limit increment so the window keeps an
            // accurate count of admitted requests.
            self.store.decr(&key).await?;
            tracing::warn!(user_id = %user_id, count, "Rate limit exceeded");
            return Ok(false);
        }

        tracing::debug!(
            user_id = %user_id,
            count,
            max = self.config.max_requests,
            "Rate limit check passed"
        );
        Ok(true)
    }

    /// Returns how many requests `user_id` has left in the current window.
    pub async fn remaining(&self, user_id: &UserId) -> CounterStoreResult<u32> {
        if !self.config.enabled {
            return Ok(self.config.max_requests);
        }

        let used = self.store.get(&rate_limit_key(user_id)).await?.unwrap_or(0);
        let used = u32::try_from(used.max(0)).unwrap_or(u32::MAX);
        Ok(self.config.max_requests.saturating_sub(used))
    }

    /// Clears the current window for `user_id` (administrative operation).
    pub async fn reset(&self, user_id: &UserId) -> CounterStoreResult<()> {
        self.store.del(&rate_limit_key(user_id)).await?;
        tracing::info!(user_id = %user_id, "Reset rate limit");
        Ok(())
    }

    /// The configuration this limiter enforces.
    pub const fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_recognized_options() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_requests, 5);
        assert_eq!(config.window, Duration::from_secs(1));
    }

    #[test]
    fn disabled_config_switches_off_enforcement() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
    }

    #[test]
    fn key_is_prefixed_with_user_id() {
        let user_id = UserId::try_new("alice").unwrap();
        assert_eq!(rate_limit_key(&user_id), "rate_limit:alice");
    }
}
