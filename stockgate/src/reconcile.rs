//! Reconciliation of the inventory ledger against canonical stock.
//!
//! The fast counter and the catalog's canonical stock count are maintained
//! independently and can drift: process restarts, counter-store data loss,
//! permanently failed durable writes. Rather than a distributed transaction,
//! drift is repaired out-of-band by overwriting the ledger from the catalog
//! — a deliberate availability-over-consistency trade-off. Reconciliation
//! operates purely on aggregate counts and never replays individual orders.
//!
//! Running a reconcile when the two sources already agree is a no-op.

use crate::counter::CounterStore;
use crate::errors::ReconcileError;
use crate::inventory::InventoryLedger;
use crate::product::ProductCatalog;
use crate::types::ProductId;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Pushes canonical stock counts from the catalog into the ledger.
#[derive(Debug)]
pub struct Reconciler<C, P> {
    ledger: InventoryLedger<C>,
    catalog: Arc<P>,
}

impl<C, P> Clone for Reconciler<C, P> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<C, P> Reconciler<C, P>
where
    C: CounterStore + 'static,
    P: ProductCatalog + 'static,
{
    /// Creates a reconciler over the given store and catalog.
    pub fn new(store: Arc<C>, catalog: Arc<P>) -> Self {
        Self {
            ledger: InventoryLedger::new(store),
            catalog,
        }
    }

    /// Overwrites one product's ledger counter with its canonical stock.
    ///
    /// Idempotent: reconciling twice with no intervening purchases leaves
    /// the ledger unchanged after the first call.
    pub async fn reconcile(&self, product_id: &ProductId) -> Result<(), ReconcileError> {
        let product = self
            .catalog
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| ReconcileError::ProductNotFound(product_id.clone()))?;

        self.ledger.initialize(product_id, product.stock).await?;
        tracing::info!(product_id = %product_id, stock = product.stock, "Reconciled inventory");
        Ok(())
    }

    /// Sweeps every product in the catalog, returning how many were
    /// reconciled.
    pub async fn reconcile_all(&self) -> Result<usize, ReconcileError> {
        let products = self.catalog.all_products().await?;
        let count = products.len();
        for product in products {
            self.ledger.initialize(&product.id, product.stock).await?;
        }
        tracing::info!(count, "Reconciliation sweep complete");
        Ok(count)
    }

    /// Runs [`reconcile_all`] on a fixed interval in a background task.
    ///
    /// The task runs until the returned handle is aborted. Sweep failures
    /// are logged and the next tick tries again.
    ///
    /// [`reconcile_all`]: Reconciler::reconcile_all
    pub fn spawn_periodic(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick fires immediately; skip it so callers get one
            // full period before the first sweep.
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(error) = self.reconcile_all().await {
                    tracing::error!(error = %error, "Periodic reconciliation failed");
                }
            }
        })
    }
}
