//! In-memory adapters for the `StockGate` admission-control core
//!
//! This crate provides in-memory implementations of the three ports from
//! the stockgate crate (`CounterStore`, `ProductCatalog`, `OrderStore`),
//! useful for testing and development scenarios where no external counter
//! store or database is available.
//!
//! Every counter operation takes the map lock exactly once, which gives the
//! single-step atomicity the admission-control components require from a
//! compliant backend.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use stockgate::errors::{CatalogError, CatalogResult, CounterStoreResult, OrderStoreResult};
use stockgate::{
    CounterStore, Order, OrderId, OrderStatus, OrderStore, Product, ProductCatalog, ProductId,
    UserId,
};

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    value: i64,
    expires_at: Option<Instant>,
}

impl CounterEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// Thread-safe in-memory counter store.
///
/// Keys behave like Redis counters: absent keys read as absent, increment
/// and decrement create them, and expired keys are treated as absent the
/// next time they are touched.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCounterStore {
    entries: Arc<RwLock<HashMap<String, CounterEntry>>>,
}

impl InMemoryCounterStore {
    /// Creates a new empty counter store.
    pub fn new() -> Self {
        Self::default()
    }

    fn adjust(&self, key: &str, delta: i64) -> i64 {
        let mut entries = self.entries.write().expect("RwLock poisoned");
        let now = Instant::now();
        let entry = entries
            .entry(key.to_string())
            .and_modify(|entry| {
                if entry.is_expired(now) {
                    entry.value = 0;
                    entry.expires_at = None;
                }
            })
            .or_insert(CounterEntry {
                value: 0,
                expires_at: None,
            });
        entry.value += delta;
        entry.value
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn incr(&self, key: &str) -> CounterStoreResult<i64> {
        Ok(self.adjust(key, 1))
    }

    async fn decr(&self, key: &str) -> CounterStoreResult<i64> {
        Ok(self.adjust(key, -1))
    }

    async fn set(&self, key: &str, value: i64) -> CounterStoreResult<()> {
        let mut entries = self.entries.write().expect("RwLock poisoned");
        entries.insert(
            key.to_string(),
            CounterEntry {
                value,
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> CounterStoreResult<Option<i64>> {
        let entries = self.entries.read().expect("RwLock poisoned");
        let now = Instant::now();
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CounterStoreResult<bool> {
        let mut entries = self.entries.write().expect("RwLock poisoned");
        let now = Instant::now();
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn del(&self, key: &str) -> CounterStoreResult<bool> {
        let mut entries = self.entries.write().expect("RwLock poisoned");
        let now = Instant::now();
        match entries.remove(key) {
            Some(entry) => Ok(!entry.is_expired(now)),
            None => Ok(false),
        }
    }
}

/// Thread-safe in-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryProductCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a product (test setup helper).
    pub fn insert(&self, product: Product) {
        let mut products = self.products.write().expect("RwLock poisoned");
        products.insert(product.id.clone(), product);
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn find_by_id(&self, product_id: &ProductId) -> CatalogResult<Option<Product>> {
        let products = self.products.read().expect("RwLock poisoned");
        Ok(products.get(product_id).cloned())
    }

    async fn all_products(&self) -> CatalogResult<Vec<Product>> {
        let products = self.products.read().expect("RwLock poisoned");
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn set_stock(&self, product_id: &ProductId, stock: u32) -> CatalogResult<()> {
        let mut products = self.products.write().expect("RwLock poisoned");
        let product = products
            .get_mut(product_id)
            .ok_or_else(|| CatalogError::ProductNotFound(product_id.clone()))?;
        product.stock = stock;
        Ok(())
    }
}

/// Thread-safe in-memory order store.
///
/// `append` enforces the `order_id` idempotency key: a duplicate append is
/// suppressed and reported as such, never stored twice.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored orders.
    pub fn len(&self) -> usize {
        self.orders.read().expect("RwLock poisoned").len()
    }

    /// Whether the store holds no orders.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn append(&self, order: Order) -> OrderStoreResult<bool> {
        let mut orders = self.orders.write().expect("RwLock poisoned");
        if orders.contains_key(&order.order_id) {
            return Ok(false);
        }
        orders.insert(order.order_id, order);
        Ok(true)
    }

    async fn find_by_order_id(&self, order_id: &OrderId) -> OrderStoreResult<Option<Order>> {
        let orders = self.orders.read().expect("RwLock poisoned");
        Ok(orders.get(order_id).cloned())
    }

    async fn orders_for_user(&self, user_id: &UserId) -> OrderStoreResult<Vec<Order>> {
        let orders = self.orders.read().expect("RwLock poisoned");
        let mut result: Vec<Order> = orders
            .values()
            .filter(|order| &order.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|order| order.order_id);
        Ok(result)
    }

    async fn count_confirmed(&self, product_id: &ProductId) -> OrderStoreResult<u64> {
        let orders = self.orders.read().expect("RwLock poisoned");
        Ok(orders
            .values()
            .filter(|order| &order.product_id == product_id && order.status == OrderStatus::Confirmed)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockgate::{Money, Quantity};

    fn product_id(id: &str) -> ProductId {
        ProductId::try_new(id).unwrap()
    }

    fn sample_order(product: &str, user: &str) -> Order {
        Order::confirmed(
            product_id(product),
            UserId::try_new(user).unwrap(),
            Quantity::one(),
            Money::from_cents(999),
        )
    }

    #[tokio::test]
    async fn incr_creates_and_counts() {
        let store = InMemoryCounterStore::new();
        assert_eq!(store.incr("k").await.unwrap(), 1);
        assert_eq!(store.incr("k").await.unwrap(), 2);
        assert_eq!(store.get("k").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn decr_can_go_negative() {
        let store = InMemoryCounterStore::new();
        assert_eq!(store.decr("k").await.unwrap(), -1);
        assert_eq!(store.incr("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn set_overwrites_and_clears_expiry() {
        let store = InMemoryCounterStore::new();
        store.set("k", 7).await.unwrap();
        assert!(store.expire("k", Duration::from_millis(10)).await.unwrap());
        store.set("k", 9).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        // The set cleared the pending expiry
        assert_eq!(store.get("k").await.unwrap(), Some(9));
    }

    #[tokio::test]
    async fn expired_keys_read_as_absent_and_reset_on_incr() {
        let store = InMemoryCounterStore::new();
        store.incr("k").await.unwrap();
        assert!(store.expire("k", Duration::from_millis(10)).await.unwrap());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        // A fresh increment supersedes the expired window
        assert_eq!(store.incr("k").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn expire_on_missing_key_is_false() {
        let store = InMemoryCounterStore::new();
        assert!(!store.expire("missing", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test]
    async fn del_reports_existence() {
        let store = InMemoryCounterStore::new();
        store.set("k", 1).await.unwrap();
        assert!(store.del("k").await.unwrap());
        assert!(!store.del("k").await.unwrap());
    }

    #[tokio::test]
    async fn clone_shares_storage() {
        let store1 = InMemoryCounterStore::new();
        let store2 = store1.clone();
        store1.set("k", 5).await.unwrap();
        assert_eq!(store2.get("k").await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn catalog_lookup_and_stock_write() {
        let catalog = InMemoryProductCatalog::new();
        catalog.insert(Product::new(
            product_id("widget-1"),
            "Widget",
            Money::from_cents(500),
            10,
        ));

        let found = catalog.find_by_id(&product_id("widget-1")).await.unwrap();
        assert_eq!(found.unwrap().stock, 10);

        catalog.set_stock(&product_id("widget-1"), 3).await.unwrap();
        let found = catalog.find_by_id(&product_id("widget-1")).await.unwrap();
        assert_eq!(found.unwrap().stock, 3);

        assert!(catalog
            .find_by_id(&product_id("missing"))
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            catalog.set_stock(&product_id("missing"), 1).await,
            Err(CatalogError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn order_append_is_idempotent_on_order_id() {
        let store = InMemoryOrderStore::new();
        let order = sample_order("widget-1", "alice");

        assert!(store.append(order.clone()).await.unwrap());
        assert!(!store.append(order.clone()).await.unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.find_by_order_id(&order.order_id).await.unwrap(),
            Some(order)
        );
    }

    #[tokio::test]
    async fn order_queries_filter_by_user_and_product() {
        let store = InMemoryOrderStore::new();
        store.append(sample_order("widget-1", "alice")).await.unwrap();
        store.append(sample_order("widget-1", "alice")).await.unwrap();
        store.append(sample_order("widget-2", "bob")).await.unwrap();

        let alice = UserId::try_new("alice").unwrap();
        assert_eq!(store.orders_for_user(&alice).await.unwrap().len(), 2);
        assert_eq!(store.count_confirmed(&product_id("widget-1")).await.unwrap(), 2);
        assert_eq!(store.count_confirmed(&product_id("widget-2")).await.unwrap(), 1);
        assert_eq!(store.count_confirmed(&product_id("missing")).await.unwrap(), 0);
    }
}
