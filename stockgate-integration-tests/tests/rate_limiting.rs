//! Rate limiter behavior over the in-memory counter store: window bounds,
//! expiry, the disabled flag, and administrative reset.

use std::sync::Arc;
use std::time::Duration;
use stockgate::{CounterStore, RateLimitConfig, RateLimiter, UserId};
use stockgate_memory::InMemoryCounterStore;
use tokio::sync::Barrier;

fn user_id(id: &str) -> UserId {
    UserId::try_new(id).unwrap()
}

fn limiter(
    store: &Arc<InMemoryCounterStore>,
    config: RateLimitConfig,
) -> RateLimiter<InMemoryCounterStore> {
    RateLimiter::new(Arc::clone(store), config)
}

/// With max 5 per window, a user issuing 6 requests gets exactly 5 through
/// and the 6th rejected.
#[tokio::test]
async fn sixth_request_in_window_is_rejected() {
    let store = Arc::new(InMemoryCounterStore::new());
    let limiter = limiter(&store, RateLimitConfig::default());
    let alice = user_id("alice");

    for _ in 0..5 {
        assert!(limiter.try_acquire(&alice).await.unwrap());
    }
    assert!(!limiter.try_acquire(&alice).await.unwrap());
    assert_eq!(limiter.remaining(&alice).await.unwrap(), 0);
}

/// After the window elapses the counter resets and the next request is
/// allowed again.
#[tokio::test]
async fn window_expiry_resets_the_counter() {
    let store = Arc::new(InMemoryCounterStore::new());
    let config = RateLimitConfig {
        enabled: true,
        max_requests: 2,
        window: Duration::from_millis(50),
    };
    let limiter = limiter(&store, config);
    let alice = user_id("alice");

    assert!(limiter.try_acquire(&alice).await.unwrap());
    assert!(limiter.try_acquire(&alice).await.unwrap());
    assert!(!limiter.try_acquire(&alice).await.unwrap());

    tokio::time::sleep(Duration::from_millis(80)).await;

    assert!(limiter.try_acquire(&alice).await.unwrap());
    assert_eq!(limiter.remaining(&alice).await.unwrap(), 1);
}

/// The over-limit increment is rolled back, so the window keeps counting
/// only admitted requests and `remaining` never underflows.
#[tokio::test]
async fn rejected_requests_do_not_consume_budget() {
    let store = Arc::new(InMemoryCounterStore::new());
    let limiter = limiter(&store, RateLimitConfig::default());
    let alice = user_id("alice");

    for _ in 0..5 {
        assert!(limiter.try_acquire(&alice).await.unwrap());
    }
    for _ in 0..10 {
        assert!(!limiter.try_acquire(&alice).await.unwrap());
    }

    // The rollback kept the stored count at the maximum
    assert_eq!(store.get("rate_limit:alice").await.unwrap(), Some(5));
    assert_eq!(limiter.remaining(&alice).await.unwrap(), 0);
}

/// The window bound holds when the requests race each other.
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_requests_respect_the_window_bound() {
    const CALLERS: usize = 24;

    let store = Arc::new(InMemoryCounterStore::new());
    let limiter = limiter(&store, RateLimitConfig::default());
    let alice = user_id("alice");

    let barrier = Arc::new(Barrier::new(CALLERS));
    let mut handles = Vec::with_capacity(CALLERS);
    for _ in 0..CALLERS {
        let limiter = limiter.clone();
        let alice = alice.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            limiter.try_acquire(&alice).await.unwrap()
        }));
    }

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 5);
}

/// Different users have independent windows.
#[tokio::test]
async fn windows_are_per_user() {
    let store = Arc::new(InMemoryCounterStore::new());
    let limiter = limiter(&store, RateLimitConfig::default());
    let alice = user_id("alice");
    let bob = user_id("bob");

    for _ in 0..5 {
        assert!(limiter.try_acquire(&alice).await.unwrap());
    }
    assert!(!limiter.try_acquire(&alice).await.unwrap());
    assert!(limiter.try_acquire(&bob).await.unwrap());
}

/// A disabled limiter admits everything without touching the store.
#[tokio::test]
async fn disabled_limiter_bypasses_the_store() {
    let store = Arc::new(InMemoryCounterStore::new());
    let limiter = limiter(&store, RateLimitConfig::disabled());
    let alice = user_id("alice");

    for _ in 0..20 {
        assert!(limiter.try_acquire(&alice).await.unwrap());
    }
    assert_eq!(store.get("rate_limit:alice").await.unwrap(), None);
    assert_eq!(limiter.remaining(&alice).await.unwrap(), 5);
}

/// Administrative reset clears the current window immediately.
#[tokio::test]
async fn reset_reopens_the_window() {
    let store = Arc::new(InMemoryCounterStore::new());
    let limiter = limiter(&store, RateLimitConfig::default());
    let alice = user_id("alice");

    for _ in 0..5 {
        assert!(limiter.try_acquire(&alice).await.unwrap());
    }
    assert!(!limiter.try_acquire(&alice).await.unwrap());

    limiter.reset(&alice).await.unwrap();

    assert_eq!(limiter.remaining(&alice).await.unwrap(), 5);
    assert!(limiter.try_acquire(&alice).await.unwrap());
}
