//! Integration Tests for the Cache facade
//!
//! Exercises the public API end to end over the in-process store and over a
//! custom backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use mini_cache::{Backend, Cache, CacheConfig, CacheError, Expiry, MemoryStore, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

// == Helper Types ==

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
}

fn john() -> User {
    User {
        id: 1,
        name: "John".to_string(),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn memory_cache() -> Cache {
    init_tracing();
    Cache::in_memory(CacheConfig::default()).unwrap()
}

/// Backend that reports an absent key as an error instead of a miss,
/// the way some remote clients do.
#[derive(Default)]
struct StrictBackend {
    entries: Mutex<HashMap<String, Bytes>>,
    closed: AtomicUsize,
}

#[async_trait]
impl Backend for StrictBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.entries
            .lock()
            .await
            .get(key)
            .cloned()
            .map(Some)
            .ok_or_else(|| CacheError::Backend(format!("nil reply for {}", key)))
    }

    async fn set(&self, key: &str, payload: Bytes, _expiry: Expiry) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), payload);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().await.contains_key(key))
    }

    async fn clear(&self) -> Result<()> {
        self.entries.lock().await.clear();
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// == Basic Operations ==

#[tokio::test]
async fn test_set_then_get_user() {
    let cache = memory_cache();

    cache
        .set("user:1", &john(), Duration::from_secs(300))
        .await
        .unwrap();

    let user: Option<User> = cache.get("user:1").await.unwrap();
    assert_eq!(user, Some(john()));
}

#[tokio::test(start_paused = true)]
async fn test_expired_user_is_a_miss() {
    let cache = memory_cache();

    cache.set("user:1", &john(), Duration::from_secs(1)).await.unwrap();
    assert_eq!(cache.get::<User>("user:1").await.unwrap(), Some(john()));

    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(!cache.exists("user:1").await.unwrap());
    let expired: Option<User> = cache.get("user:1").await.unwrap();
    assert_eq!(expired.unwrap_or_default(), User::default());
}

#[tokio::test]
async fn test_never_set_key_is_a_miss() {
    let cache = memory_cache();

    assert!(matches!(cache.get::<User>("ghost").await, Ok(None)));
    assert!(!cache.exists("ghost").await.unwrap());
}

#[tokio::test]
async fn test_clear_removes_all_keys() {
    let cache = memory_cache();

    cache.set("a", &1, Duration::from_secs(300)).await.unwrap();
    cache.set("b", &2, Duration::from_secs(300)).await.unwrap();
    cache.clear().await.unwrap();

    assert!(!cache.exists("a").await.unwrap());
    assert!(!cache.exists("b").await.unwrap());
}

#[tokio::test]
async fn test_delete_twice_is_fine() {
    let cache = memory_cache();

    cache.set("a", &1, Expiry::Never).await.unwrap();
    cache.delete("a").await.unwrap();
    cache.delete("a").await.unwrap();

    assert!(!cache.exists("a").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_zero_ttl_never_expires() {
    let cache = memory_cache();

    cache.set("config", &"v1", Duration::ZERO).await.unwrap();
    tokio::time::sleep(Duration::from_secs(86_400)).await;

    assert!(cache.exists("config").await.unwrap());
}

// == Remember ==

#[tokio::test]
async fn test_remember_populates_once() {
    let cache = memory_cache();
    let first_calls = AtomicUsize::new(0);
    let second_calls = AtomicUsize::new(0);

    let user: User = cache
        .remember("user:1", Duration::from_secs(300), || async {
            first_calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, anyhow::Error>(john())
        })
        .await
        .unwrap();
    assert_eq!(user, john());

    let cached: User = cache
        .remember("user:1", Duration::from_secs(300), || async {
            second_calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, anyhow::Error>(User::default())
        })
        .await
        .unwrap();

    assert_eq!(cached, john());
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_remember_over_backend_that_errors_on_absence() {
    init_tracing();
    let cache = Cache::new(StrictBackend::default());
    let first_calls = AtomicUsize::new(0);
    let second_calls = AtomicUsize::new(0);

    assert!(matches!(
        cache.get::<User>("user:1").await,
        Err(CacheError::Backend(_))
    ));

    let user: User = cache
        .remember("user:1", Duration::from_secs(300), || async {
            first_calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, anyhow::Error>(john())
        })
        .await
        .unwrap();
    assert_eq!(user, john());
    assert!(cache.exists("user:1").await.unwrap());

    let cached: User = cache
        .remember("user:1", Duration::from_secs(300), || async {
            second_calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, anyhow::Error>(User::default())
        })
        .await
        .unwrap();

    assert_eq!(cached, john());
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_remember_recomputes_after_expiry() {
    let cache = memory_cache();
    let calls = AtomicUsize::new(0);

    for _ in 0..2 {
        let _: u32 = cache
            .remember("counter", Duration::from_secs(1), || async {
                Ok::<_, anyhow::Error>(calls.fetch_add(1, Ordering::SeqCst) as u32)
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_remember_compute_error_surfaces_verbatim() {
    #[derive(Debug, thiserror::Error)]
    #[error("upstream timed out")]
    struct UpstreamTimeout;

    let cache = memory_cache();

    let err = cache
        .remember("report", Expiry::Never, || async {
            Err::<String, _>(UpstreamTimeout)
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "upstream timed out");
    match err {
        CacheError::Compute(inner) => assert!(inner.downcast_ref::<UpstreamTimeout>().is_some()),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!cache.exists("report").await.unwrap());
}

#[tokio::test]
async fn test_concurrent_remember_has_no_single_flight() {
    let cache = memory_cache();
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(tokio::sync::Barrier::new(2));

    let remember = |label: &'static str| {
        let cache = cache.clone();
        let calls = Arc::clone(&calls);
        let barrier = Arc::clone(&barrier);
        async move {
            cache
                .remember("k", Duration::from_secs(300), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    // Both callers are past their lookup before either writes
                    barrier.wait().await;
                    Ok::<_, anyhow::Error>(label.to_string())
                })
                .await
        }
    };

    let (a, b) = tokio::join!(remember("A"), remember("B"));
    assert_eq!(a.unwrap(), "A");
    assert_eq!(b.unwrap(), "B");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let stored: String = cache.get("k").await.unwrap().unwrap();
    assert!(stored == "A" || stored == "B");
}

// == Backend Polymorphism ==

#[tokio::test]
async fn test_shared_backend_is_visible_through_both_handles() {
    init_tracing();
    let store = Arc::new(MemoryStore::new().unwrap());
    let cache = Cache::from_shared(store.clone());

    cache.set("user:1", &john(), Duration::from_secs(60)).await.unwrap();

    assert!(store.exists("user:1").await.unwrap());
    assert_eq!(store.stats().await.live_entries, 1);
}

#[tokio::test]
async fn test_close_reaches_backend() {
    let backend = Arc::new(StrictBackend::default());
    let cache = Cache::from_shared(backend.clone());

    cache.close().await.unwrap();
    assert_eq!(backend.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_close_memory_cache() {
    let cache = memory_cache();
    cache.set("a", &1, Expiry::Never).await.unwrap();

    cache.close().await.unwrap();
    cache.close().await.unwrap();

    assert_eq!(cache.get::<i32>("a").await.unwrap(), Some(1));
}
