//! Atomic counter store abstraction.
//!
//! This module defines the [`CounterStore`] trait, the port interface every
//! counter backend must satisfy. The admission-control components
//! ([`crate::limiter::RateLimiter`] and [`crate::inventory::InventoryLedger`])
//! are correct only because `incr` and `decr` are indivisible single-round-trip
//! operations: the application never performs a local read-modify-write, and
//! no in-process lock is shared across requests.
//!
//! Implementations may be backed by anything exposing these primitives
//! (a Redis-style cache, an in-memory map for tests); no component assumes a
//! specific store's transport.

use crate::errors::CounterStoreResult;
use async_trait::async_trait;
use std::time::Duration;

/// The atomic counter capability that all backends must provide.
///
/// Every method is a single atomic step as observed by concurrent callers.
/// Missing keys behave as Redis counters do: `incr` and `decr` treat an
/// absent key as 0 and create it.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increments the counter at `key` by one.
    ///
    /// Returns the post-increment value. An absent key is created with
    /// value 1.
    ///
    /// # Errors
    /// Returns `CounterStoreError` if the store is unreachable. The caller
    /// must treat this as failure, never as success.
    async fn incr(&self, key: &str) -> CounterStoreResult<i64>;

    /// Atomically decrements the counter at `key` by one.
    ///
    /// Returns the post-decrement value, which may be negative. An absent
    /// key is created with value -1. Callers that must not leave the counter
    /// negative are responsible for issuing a compensating [`incr`].
    ///
    /// [`incr`]: CounterStore::incr
    async fn decr(&self, key: &str) -> CounterStoreResult<i64>;

    /// Sets the counter at `key` to `value`, creating it if necessary and
    /// clearing any expiry.
    async fn set(&self, key: &str, value: i64) -> CounterStoreResult<()>;

    /// Reads the current value at `key`, or `None` if the key is absent or
    /// expired.
    ///
    /// A raw read is never authoritative for admission decisions: it can
    /// observe a negative excursion that a concurrent decrementer is about
    /// to compensate. Readers must treat any value ≤ 0 as "no stock".
    async fn get(&self, key: &str) -> CounterStoreResult<Option<i64>>;

    /// Attaches an expiry to `key`.
    ///
    /// Returns `true` if the key existed and the expiry was set, `false`
    /// if the key was absent.
    async fn expire(&self, key: &str, ttl: Duration) -> CounterStoreResult<bool>;

    /// Deletes `key`.
    ///
    /// Returns `true` if the key existed.
    async fn del(&self, key: &str) -> CounterStoreResult<bool>;
}
