//! Error types for `StockGate`.
//!
//! Each subsystem has its own error enum so that callers can tell failure
//! classes apart:
//!
//! - [`CounterStoreError`]: the atomic counter store is unreachable or
//!   misbehaving. Always handled fail-closed — never interpreted as success.
//! - [`CatalogError`]: product catalog lookups and canonical stock writes.
//! - [`OrderStoreError`]: durable order persistence. These surface only in
//!   the async writer, never to the purchase caller.
//! - [`EnqueueError`]: the bounded persistence queue rejected an order. A
//!   soft, post-commit condition.
//! - [`ReconcileError`]: reconciliation of the ledger against canonical
//!   stock.
//!
//! The purchase orchestrator never lets any of these escape; every failure
//! mode maps to a `PurchaseOutcome` variant.

use crate::types::ProductId;
use thiserror::Error;

/// Errors raised by an atomic counter store implementation.
///
/// A counter-store error during admission is treated as a failure of the
/// whole purchase (fail-closed). There is no retry of the decrement itself.
#[derive(Debug, Clone, Error)]
pub enum CounterStoreError {
    /// The connection to the counter store failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The operation did not complete in time.
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The counter store is temporarily unavailable.
    #[error("Counter store unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by a product catalog implementation.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// A canonical-stock write referenced a product that does not exist.
    #[error("Product '{0}' not found")]
    ProductNotFound(ProductId),

    /// The connection to the catalog failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// An unexpected internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by a durable order store implementation.
#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    /// The connection to the order store failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// An unexpected internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised when handing an order to the asynchronous writer.
///
/// Enqueue failures are soft: the purchase has already committed by the
/// time an order is enqueued, so these are logged against the successful
/// purchase and repaired out-of-band, never returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnqueueError {
    /// The bounded queue is at capacity. The order is rejected rather than
    /// blocking the request path or being silently dropped.
    #[error("Persistence queue full (capacity {capacity})")]
    QueueFull {
        /// The configured queue capacity.
        capacity: usize,
    },

    /// The writer has shut down and no longer accepts orders.
    #[error("Persistence queue closed")]
    Closed,
}

/// Errors raised while reconciling the inventory ledger against the
/// catalog's canonical stock.
#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    /// The product to reconcile does not exist in the catalog.
    #[error("Product '{0}' not found")]
    ProductNotFound(ProductId),

    /// The counter store rejected the overwrite.
    #[error("Counter store error: {0}")]
    CounterStore(#[from] CounterStoreError),

    /// The catalog could not be read.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Type alias for counter store results.
pub type CounterStoreResult<T> = Result<T, CounterStoreError>;

/// Type alias for catalog results.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Type alias for order store results.
pub type OrderStoreResult<T> = Result<T, OrderStoreError>;
