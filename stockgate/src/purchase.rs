//! The purchase orchestrator.
//!
//! Sequences the admission decision: rate limit, catalog lookup, atomic
//! inventory decrement, asynchronous order persistence. Each step
//! short-circuits on failure and no step is retried automatically. The
//! orchestrator never lets an internal error escape — every failure mode
//! maps to a [`PurchaseOutcome`] variant, so callers always get a
//! definitive, immediate answer.
//!
//! Once the inventory decrement succeeds the purchase is committed: a unit
//! has been promised to the caller and is never re-offered, even if the
//! durable write later fails. Durable-write faults are soft, post-commit
//! conditions repaired by reconciliation.

use crate::counter::CounterStore;
use crate::errors::CounterStoreResult;
use crate::inventory::{DecrementOutcome, InventoryLedger};
use crate::limiter::{RateLimitConfig, RateLimiter};
use crate::order::Order;
use crate::product::ProductCatalog;
use crate::types::{OrderId, ProductId, Quantity, UserId};
use crate::writer::OrderWriter;
use std::sync::Arc;

/// The definitive result of one purchase attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// A unit was promised to the caller; the order is queued for durable
    /// persistence.
    Success {
        /// The admitted order's id.
        order_id: OrderId,
    },
    /// No units were left. The expected, frequent admission-control
    /// outcome, not a fault.
    OutOfStock,
    /// The user exhausted the current rate-limit window.
    RateLimited,
    /// The product does not exist in the catalog.
    ProductNotFound,
    /// A collaborator was unreachable; the purchase failed closed and no
    /// unit was consumed.
    TransientError,
}

impl PurchaseOutcome {
    /// Whether a unit was promised to the caller.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Orchestrates rate limiting, product lookup, inventory decrement and
/// order emission into a single admission decision.
///
/// The orchestrator is the only component touching the rate limiter and the
/// inventory ledger on the hot path. Correctness under concurrency comes
/// entirely from the counter store's atomic operations; no in-process lock
/// is shared across requests.
#[derive(Debug)]
pub struct PurchaseOrchestrator<C, P> {
    limiter: RateLimiter<C>,
    ledger: InventoryLedger<C>,
    catalog: Arc<P>,
    writer: OrderWriter,
}

impl<C, P> PurchaseOrchestrator<C, P>
where
    C: CounterStore,
    P: ProductCatalog,
{
    /// Wires an orchestrator over the given collaborators.
    pub fn new(
        store: Arc<C>,
        catalog: Arc<P>,
        writer: OrderWriter,
        rate_limit: RateLimitConfig,
    ) -> Self {
        Self {
            limiter: RateLimiter::new(Arc::clone(&store), rate_limit),
            ledger: InventoryLedger::new(store),
            catalog,
            writer,
        }
    }

    /// Decides one purchase attempt.
    ///
    /// Sequence: rate limit → catalog lookup → inventory decrement → order
    /// enqueue. The consumed rate-limit token is not refunded if a later
    /// step fails — rate limiting bounds request volume, not successful
    /// purchases. Any collaborator error fails the attempt closed as
    /// [`PurchaseOutcome::TransientError`].
    pub async fn purchase(
        &self,
        product_id: &ProductId,
        user_id: &UserId,
        quantity: Quantity,
    ) -> PurchaseOutcome {
        tracing::info!(product_id = %product_id, user_id = %user_id, "Purchase attempt");

        match self.limiter.try_acquire(user_id).await {
            Ok(true) => {}
            Ok(false) => return PurchaseOutcome::RateLimited,
            Err(error) => {
                tracing::warn!(user_id = %user_id, error = %error, "Rate limit check failed");
                return PurchaseOutcome::TransientError;
            }
        }

        let product = match self.catalog.find_by_id(product_id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                tracing::warn!(product_id = %product_id, "Product not found");
                return PurchaseOutcome::ProductNotFound;
            }
            Err(error) => {
                tracing::error!(product_id = %product_id, error = %error, "Catalog lookup failed");
                return PurchaseOutcome::TransientError;
            }
        };

        // The critical step: exactly one caller per unit gets a
        // non-negative remaining value back.
        let remaining = match self.ledger.decrement(product_id).await {
            Ok(DecrementOutcome::Remaining(remaining)) => remaining,
            Ok(DecrementOutcome::OutOfStock) => return PurchaseOutcome::OutOfStock,
            Err(error) => {
                tracing::error!(product_id = %product_id, error = %error, "Inventory decrement failed");
                return PurchaseOutcome::TransientError;
            }
        };

        // Committed from here on: the unit is promised and never re-offered.
        let order = Order::confirmed(
            product_id.clone(),
            user_id.clone(),
            quantity,
            product.price,
        );
        let order_id = order.order_id;

        if let Err(error) = self.writer.enqueue(order) {
            tracing::warn!(
                order_id = %order_id,
                error = %error,
                "Purchase admitted but order enqueue failed; drift until reconciliation"
            );
        }

        tracing::info!(
            order_id = %order_id,
            product_id = %product_id,
            user_id = %user_id,
            remaining,
            "Purchase successful"
        );
        PurchaseOutcome::Success { order_id }
    }

    /// Current ledger value for a product (may transiently read ≤ 0).
    pub async fn inventory(&self, product_id: &ProductId) -> CounterStoreResult<i64> {
        self.ledger.get(product_id).await
    }

    /// Whether at least one unit remains in the ledger.
    pub async fn has_stock(&self, product_id: &ProductId) -> CounterStoreResult<bool> {
        self.ledger.has_stock(product_id).await
    }

    /// Seeds the ledger for a product (product creation/update path).
    pub async fn initialize_inventory(
        &self,
        product_id: &ProductId,
        stock: u32,
    ) -> CounterStoreResult<()> {
        self.ledger.initialize(product_id, stock).await
    }

    /// Returns one unit to the pool (returns/cancellations).
    pub async fn increment_inventory(&self, product_id: &ProductId) -> CounterStoreResult<i64> {
        self.ledger.increment(product_id).await
    }

    /// Clears a user's rate-limit window (administrative operation).
    pub async fn reset_rate_limit(&self, user_id: &UserId) -> CounterStoreResult<()> {
        self.limiter.reset(user_id).await
    }

    /// Requests the user has left in the current window.
    pub async fn rate_limit_remaining(&self, user_id: &UserId) -> CounterStoreResult<u32> {
        self.limiter.remaining(user_id).await
    }

    /// Closes the persistence queue and waits for queued orders to drain.
    pub async fn shutdown(self) {
        self.writer.shutdown().await;
    }
}
