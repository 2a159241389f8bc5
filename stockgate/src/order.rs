//! Order model and the durable order store port.
//!
//! An order is created at the instant an inventory decrement succeeds and is
//! persisted asynchronously; it is never mutated by the ledger or the rate
//! limiter. The `order_id` doubles as the idempotency key for durable
//! persistence, making writer retries safe.

use crate::errors::OrderStoreResult;
use crate::product::Money;
use crate::types::{OrderId, ProductId, Quantity, Timestamp, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created but not yet confirmed.
    Pending,
    /// Admission succeeded; this is the status orders are written with.
    Confirmed,
    /// Cancelled after the fact; the unit goes back via the returns path.
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Confirmed => write!(f, "Confirmed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A purchase admitted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Globally unique identifier, generated at admission time. Doubles as
    /// the persistence idempotency key.
    pub order_id: OrderId,
    /// The purchased product.
    pub product_id: ProductId,
    /// The purchasing user.
    pub user_id: UserId,
    /// Requested quantity, recorded from the purchase attempt.
    pub quantity: Quantity,
    /// Unit price snapshot taken at admission time.
    pub unit_price: Money,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// When the order was created.
    pub created_at: Timestamp,
}

impl Order {
    /// Creates a confirmed order with a fresh id and the current timestamp.
    ///
    /// Called by the orchestrator exactly once per successful decrement.
    pub fn confirmed(
        product_id: ProductId,
        user_id: UserId,
        quantity: Quantity,
        unit_price: Money,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            product_id,
            user_id,
            quantity,
            unit_price,
            status: OrderStatus::Confirmed,
            created_at: Timestamp::now(),
        }
    }
}

/// The durable order store port.
///
/// An external collaborator written to asynchronously by the order writer;
/// it is the canonical, queryable order history and never participates in
/// the admission decision.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order, keyed by `order_id`.
    ///
    /// Returns `true` if the order was inserted and `false` if an order
    /// with the same id already existed (the duplicate is suppressed, not
    /// an error).
    async fn append(&self, order: Order) -> OrderStoreResult<bool>;

    /// Looks up an order by id.
    async fn find_by_order_id(&self, order_id: &OrderId) -> OrderStoreResult<Option<Order>>;

    /// All orders placed by a user.
    async fn orders_for_user(&self, user_id: &UserId) -> OrderStoreResult<Vec<Order>>;

    /// Number of confirmed orders for a product. Used to audit the
    /// consumed-stock invariant once the writer has caught up.
    async fn count_confirmed(&self, product_id: &ProductId) -> OrderStoreResult<u64>;
}
