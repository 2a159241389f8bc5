//! Asynchronous durable order recording.
//!
//! The orchestrator hands each admitted order to an [`OrderWriter`], which
//! queues it on a bounded channel serviced by a small worker pool. The
//! request path never waits on durable-store I/O: a full queue rejects the
//! enqueue (surfaced as a soft persist-failed condition against the
//! already-successful purchase) rather than blocking or silently dropping.
//!
//! Workers persist with the `order_id` idempotency key, retry transient
//! failures a bounded number of times with jittered backoff, and finally log
//! a soft error. Nothing here can retroactively change a purchase outcome;
//! permanently failed writes show up as drift that reconciliation closes.

use crate::errors::EnqueueError;
use crate::order::{Order, OrderStore};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Configuration for the order writer.
#[derive(Debug, Clone)]
pub struct OrderWriterConfig {
    /// Maximum number of orders waiting to be persisted.
    pub capacity: usize,
    /// Number of worker tasks draining the queue.
    pub workers: usize,
    /// How many times a failed persist is retried before being logged as a
    /// soft error.
    pub max_retries: u32,
    /// Base delay between retry attempts; each sleep adds up to 50% jitter.
    pub retry_delay: Duration,
}

impl Default for OrderWriterConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            workers: 4,
            max_retries: 3,
            retry_delay: Duration::from_millis(100),
        }
    }
}

/// Bounded asynchronous queue plus worker pool for order persistence.
///
/// Dropping the writer closes the queue; [`shutdown`] additionally waits
/// for the workers to drain what was already accepted.
///
/// [`shutdown`]: OrderWriter::shutdown
#[derive(Debug)]
pub struct OrderWriter {
    sender: mpsc::Sender<Order>,
    workers: Vec<JoinHandle<()>>,
    capacity: usize,
}

impl OrderWriter {
    /// Starts the worker pool over the given order store.
    pub fn spawn<S: OrderStore + 'static>(store: Arc<S>, config: OrderWriterConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.capacity);
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers = (0..config.workers.max(1))
            .map(|worker| {
                let store = Arc::clone(&store);
                let receiver = Arc::clone(&receiver);
                let config = config.clone();
                tokio::spawn(async move {
                    worker_loop(worker, store, receiver, config).await;
                })
            })
            .collect();

        Self {
            sender,
            workers,
            capacity: config.capacity,
        }
    }

    /// Queues an order for durable persistence without blocking.
    ///
    /// # Errors
    /// Returns [`EnqueueError::QueueFull`] when the queue is saturated and
    /// [`EnqueueError::Closed`] after shutdown. Both are soft, post-commit
    /// conditions: the purchase has already been admitted.
    pub fn enqueue(&self, order: Order) -> Result<(), EnqueueError> {
        self.sender.try_send(order).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => EnqueueError::QueueFull {
                capacity: self.capacity,
            },
            mpsc::error::TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }

    /// Closes the queue and waits for the workers to drain it.
    pub async fn shutdown(self) {
        drop(self.sender);
        for handle in self.workers {
            if let Err(error) = handle.await {
                tracing::error!(error = %error, "Order writer worker panicked");
            }
        }
        tracing::info!("Order writer stopped");
    }
}

async fn worker_loop<S: OrderStore>(
    worker: usize,
    store: Arc<S>,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<Order>>>,
    config: OrderWriterConfig,
) {
    loop {
        // Hold the lock only for the recv so workers drain in parallel.
        let order = { receiver.lock().await.recv().await };
        let Some(order) = order else {
            tracing::debug!(worker, "Order queue closed, worker exiting");
            break;
        };
        persist_with_retry(store.as_ref(), order, &config).await;
    }
}

async fn persist_with_retry<S: OrderStore>(store: &S, order: Order, config: &OrderWriterConfig) {
    let order_id = order.order_id;
    for attempt in 0..=config.max_retries {
        match store.append(order.clone()).await {
            Ok(true) => {
                tracing::info!(order_id = %order_id, user_id = %order.user_id, "Order persisted");
                return;
            }
            Ok(false) => {
                tracing::debug!(order_id = %order_id, "Duplicate order append suppressed");
                return;
            }
            Err(error) if attempt < config.max_retries => {
                tracing::warn!(
                    order_id = %order_id,
                    attempt,
                    error = %error,
                    "Order persist failed, retrying"
                );
                tokio::time::sleep(jittered(config.retry_delay)).await;
            }
            Err(error) => {
                // Soft failure: the purchase already committed. Reconciliation
                // closes the resulting drift.
                tracing::error!(
                    order_id = %order_id,
                    retries = config.max_retries,
                    error = %error,
                    "Order persist failed permanently"
                );
                return;
            }
        }
    }
}

fn jittered(base: Duration) -> Duration {
    let max_jitter = base.as_millis() / 2;
    let jitter = if max_jitter == 0 {
        0
    } else {
        rand::rng().random_range(0..=max_jitter)
    };
    base + Duration::from_millis(u64::try_from(jitter).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_bounded() {
        let config = OrderWriterConfig::default();
        assert_eq!(config.capacity, 1024);
        assert_eq!(config.workers, 4);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(100));
    }

    #[test]
    fn jitter_stays_within_half_the_base_delay() {
        let base = Duration::from_millis(100);
        for _ in 0..100 {
            let delay = jittered(base);
            assert!(delay >= base);
            assert!(delay <= base + Duration::from_millis(50));
        }
    }

    #[test]
    fn zero_base_delay_produces_no_jitter() {
        assert_eq!(jittered(Duration::ZERO), Duration::ZERO);
    }
}
