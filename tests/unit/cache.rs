//! Unit tests for the TTL cache

use stockwatch::cache::TtlCache;
use tokio::time::{advance, Duration};

#[tokio::test(start_paused = true)]
async fn test_get_before_expiry() {
    let cache: TtlCache<String> = TtlCache::new();
    cache
        .set("quote:ACME", "hit".to_string(), Duration::from_secs(900))
        .await;

    advance(Duration::from_secs(899)).await;
    assert_eq!(cache.get("quote:ACME").await.as_deref(), Some("hit"));
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_ttl() {
    let cache: TtlCache<String> = TtlCache::new();
    cache
        .set("quote:ACME", "stale".to_string(), Duration::from_secs(900))
        .await;

    advance(Duration::from_secs(901)).await;
    assert!(cache.get("quote:ACME").await.is_none());
    assert!(cache.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_per_entry_ttl() {
    let cache: TtlCache<u32> = TtlCache::new();
    cache.set("short", 1, Duration::from_secs(10)).await;
    cache.set("long", 2, Duration::from_secs(100)).await;

    advance(Duration::from_secs(11)).await;
    assert!(cache.get("short").await.is_none());
    assert_eq!(cache.get("long").await, Some(2));
}

#[tokio::test]
async fn test_delete_and_prefix_delete() {
    let cache: TtlCache<u32> = TtlCache::new();
    cache.set("history:ACME:1m", 1, Duration::from_secs(60)).await;
    cache.set("history:ACME:1y", 2, Duration::from_secs(60)).await;
    cache.set("history:OTHR:1m", 3, Duration::from_secs(60)).await;
    cache.set("quote:ACME", 4, Duration::from_secs(60)).await;

    cache.delete("quote:ACME").await;
    cache.delete_prefix("history:ACME:").await;

    assert!(cache.get("quote:ACME").await.is_none());
    assert!(cache.get("history:ACME:1m").await.is_none());
    assert!(cache.get("history:ACME:1y").await.is_none());
    assert_eq!(cache.get("history:OTHR:1m").await, Some(3));
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_set_overwrites_existing() {
    let cache: TtlCache<u32> = TtlCache::new();
    cache.set("k", 1, Duration::from_secs(60)).await;
    cache.set("k", 2, Duration::from_secs(60)).await;
    assert_eq!(cache.get("k").await, Some(2));
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_clear() {
    let cache: TtlCache<u32> = TtlCache::new();
    cache.set("a", 1, Duration::from_secs(60)).await;
    cache.set("b", 2, Duration::from_secs(60)).await;
    cache.clear().await;
    assert!(cache.is_empty().await);
}
