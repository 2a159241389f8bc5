//! `StockGate` - admission control for limited-inventory sales
//!
//! This library decides, under heavy concurrent load, which purchase
//! attempts may consume one of a fixed number of inventory units, while
//! throttling per-user request rates. Correctness rests on a single
//! primitive: a counter store with indivisible increment/decrement, behind
//! the [`CounterStore`] port. On top of it sit a fixed-window
//! [`RateLimiter`], the [`InventoryLedger`] (the sole authority for "is
//! there a unit left"), the [`PurchaseOrchestrator`] sequencing the two
//! with a catalog lookup, an asynchronous [`OrderWriter`], and a
//! [`Reconciler`] that repairs drift between the fast counter and the
//! canonical stock count.
//!
//! Durability is intentionally decoupled from admission: the hot path never
//! waits on the durable order store, and eventual-consistency faults are
//! repaired out-of-band.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod counter;
pub mod errors;
pub mod inventory;
pub mod limiter;
pub mod order;
pub mod product;
pub mod purchase;
pub mod reconcile;
pub mod types;
pub mod writer;

pub use counter::CounterStore;
pub use errors::{
    CatalogError, CatalogResult, CounterStoreError, CounterStoreResult, EnqueueError,
    OrderStoreError, OrderStoreResult, ReconcileError,
};
pub use inventory::{DecrementOutcome, InventoryLedger};
pub use limiter::{RateLimitConfig, RateLimiter};
pub use order::{Order, OrderStatus, OrderStore};
pub use product::{Money, MoneyError, Product, ProductCatalog};
pub use purchase::{PurchaseOrchestrator, PurchaseOutcome};
pub use reconcile::Reconciler;
pub use types::{OrderId, ProductId, Quantity, Timestamp, UserId};
pub use writer::{OrderWriter, OrderWriterConfig};
