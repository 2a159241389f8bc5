//! Per-product atomic inventory ledger.
//!
//! The ledger is the single authority for "is there a unit left". Each
//! product's remaining stock lives in one counter-store key, and admission
//! is a single atomic decrement: exactly one caller per unit observes a
//! non-negative remaining value. A decrement that drives the counter
//! negative is compensated with an increment before out-of-stock is
//! reported, so the counter settles back to zero.
//!
//! Raw reads through [`InventoryLedger::get`] can observe the brief
//! negative excursion between a decrement and its compensation; readers
//! must treat any value ≤ 0 as "no stock", never as an error.

use crate::counter::CounterStore;
use crate::errors::CounterStoreResult;
use crate::types::ProductId;
use std::sync::Arc;

const INVENTORY_KEY_PREFIX: &str = "inventory:";

fn inventory_key(product_id: &ProductId) -> String {
    format!("{INVENTORY_KEY_PREFIX}{product_id}")
}

/// The result of one atomic decrement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// A unit was consumed; this many units remain. No other successful
    /// caller observes the same remaining value for the same product.
    Remaining(u64),
    /// No units were left. The attempted decrement has already been
    /// compensated.
    OutOfStock,
}

impl DecrementOutcome {
    /// Whether a unit was consumed.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Remaining(_))
    }
}

/// Per-product stock counter over an atomic counter store.
///
/// Cloning is cheap and shares the underlying store.
#[derive(Debug)]
pub struct InventoryLedger<C> {
    store: Arc<C>,
}

impl<C> Clone for InventoryLedger<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<C: CounterStore> InventoryLedger<C> {
    /// Creates a new ledger over the given counter store.
    pub fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    /// Sets a product's counter to `stock`, overwriting any previous value.
    ///
    /// Used both to seed a new product and by reconciliation to push the
    /// canonical stock count into the ledger.
    pub async fn initialize(&self, product_id: &ProductId, stock: u32) -> CounterStoreResult<()> {
        self.store
            .set(&inventory_key(product_id), i64::from(stock))
            .await?;
        tracing::info!(product_id = %product_id, stock, "Initialized inventory");
        Ok(())
    }

    /// Attempts to consume one unit of `product_id`.
    ///
    /// Issues a single atomic decrement. A negative post-decrement value
    /// means the caller lost the race for the last unit; the counter is
    /// restored with a compensating increment and `OutOfStock` is returned.
    ///
    /// # Errors
    /// Returns an error if the counter store is unreachable, including when
    /// the compensating increment itself fails. In that second case the
    /// counter is left drifted below zero and the next reconciliation
    /// repairs it; the purchase still fails closed.
    pub async fn decrement(&self, product_id: &ProductId) -> CounterStoreResult<DecrementOutcome> {
        let key = inventory_key(product_id);
        let remaining = self.store.decr(&key).await?;

        if remaining < 0 {
            if let Err(error) = self.store.incr(&key).await {
                tracing::error!(
                    product_id = %product_id,
                    error = %error,
                    "Compensating increment failed; counter needs reconciliation"
                );
                return Err(error);
            }
            tracing::warn!(product_id = %product_id, "Out of stock");
            return Ok(DecrementOutcome::OutOfStock);
        }

        tracing::debug!(product_id = %product_id, remaining, "Inventory decremented");
        Ok(DecrementOutcome::Remaining(remaining.unsigned_abs()))
    }

    /// Returns one unit of `product_id` to the pool (returns/cancellations
    /// and rate-limiter-style rollbacks).
    pub async fn increment(&self, product_id: &ProductId) -> CounterStoreResult<i64> {
        let value = self.store.incr(&inventory_key(product_id)).await?;
        tracing::info!(product_id = %product_id, stock = value, "Inventory incremented");
        Ok(value)
    }

    /// Reads the current counter value.
    ///
    /// An absent key reads as 0. The value may transiently be negative
    /// while a racing decrement is being compensated; treat anything ≤ 0
    /// as "no stock".
    pub async fn get(&self, product_id: &ProductId) -> CounterStoreResult<i64> {
        Ok(self
            .store
            .get(&inventory_key(product_id))
            .await?
            .unwrap_or(0))
    }

    /// Whether at least one unit remains.
    pub async fn has_stock(&self, product_id: &ProductId) -> CounterStoreResult<bool> {
        Ok(self.get(product_id).await? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_prefixed_with_product_id() {
        let product_id = ProductId::try_new("widget-1").unwrap();
        assert_eq!(inventory_key(&product_id), "inventory:widget-1");
    }

    #[test]
    fn decrement_outcome_success_flag() {
        assert!(DecrementOutcome::Remaining(0).is_success());
        assert!(DecrementOutcome::Remaining(41).is_success());
        assert!(!DecrementOutcome::OutOfStock.is_success());
    }
}
