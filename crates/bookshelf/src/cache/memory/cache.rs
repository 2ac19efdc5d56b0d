//! In-memory cache implementation with LRU eviction.
//!
//! Provides a thread-safe in-memory cache with TTL support using
//! tokio synchronization primitives and LRU eviction policy.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use bookshelf_core::cache::{Cache, CacheError, Result};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    /// Creates a new cache entry with optional TTL.
    ///
    /// A TTL past the clock's range never expires.
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.and_then(|d| Instant::now().checked_add(d));
        Self { value, expires_at }
    }

    /// Returns true if this entry has expired.
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Thread-safe cache using `Arc<RwLock<LruCache>>` for concurrent access.
/// Expired entries are dropped when they are next read.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache with LRU eviction.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::OperationFailed` if `max_entries` is 0.
    pub fn new(max_entries: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(max_entries).ok_or_else(|| {
            CacheError::OperationFailed("max_entries must be greater than zero".to_string())
        })?;
        Ok(Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
        })
    }

    /// Number of entries currently held, expired ones included.
    #[cfg(test)]
    async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        // LruCache::get bumps recency, so even reads need the write lock.
        let mut store = self.store.write().await;

        match store.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        // Expired: drop it now rather than wait for eviction.
        store.pop(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.write().await;
        store.put(key.to_string(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.pop(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Default max entries for tests
    const TEST_MAX_ENTRIES: usize = 1000;

    fn test_cache() -> MemoryCache {
        MemoryCache::new(TEST_MAX_ENTRIES).unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = test_cache();
        let value = b"test value";

        cache.set("dune", value, None).await.unwrap();
        let result = cache.get("dune").await.unwrap();

        assert_eq!(result, Some(value.to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = test_cache();
        let result = cache.get("nonexistent").await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = test_cache();

        cache.set("dune", b"first", None).await.unwrap();
        cache.set("dune", b"second", None).await.unwrap();

        assert_eq!(cache.get("dune").await.unwrap(), Some(b"second".to_vec()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = test_cache();

        cache.set("dune", b"to be deleted", None).await.unwrap();
        assert!(cache.get("dune").await.unwrap().is_some());

        cache.delete("dune").await.unwrap();
        assert!(cache.get("dune").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let cache = test_cache();
        assert!(cache.delete("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = test_cache();

        cache
            .set("short", b"short-lived", Some(Duration::from_millis(50)))
            .await
            .unwrap();

        // Should exist immediately
        assert!(cache.get("short").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        // Expired entries read as a miss and are dropped
        assert!(cache.get("short").await.unwrap().is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_does_not_panic() {
        let cache = test_cache();

        cache
            .set("forever", b"kept", Some(Duration::MAX))
            .await
            .unwrap();

        assert_eq!(cache.get("forever").await.unwrap(), Some(b"kept".to_vec()));
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(2).unwrap();

        cache.set("a", b"1", None).await.unwrap();
        cache.set("b", b"2", None).await.unwrap();
        // Touch "a" so "b" is least recently used.
        cache.get("a").await.unwrap();
        cache.set("c", b"3", None).await.unwrap();

        assert!(cache.get("a").await.unwrap().is_some());
        assert!(cache.get("b").await.unwrap().is_none());
        assert!(cache.get("c").await.unwrap().is_some());
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(matches!(
            MemoryCache::new(0),
            Err(CacheError::OperationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = test_cache();
        let clone = cache.clone();

        clone.set("dune", b"shared", None).await.unwrap();

        assert_eq!(cache.get("dune").await.unwrap(), Some(b"shared".to_vec()));
    }
}
