//! Redis cache implementation.
//!
//! Values are stored as plain strings under their key with `SET ... EX`.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use bookshelf_core::cache::{Cache, Result};

use super::error::map_redis_error;

/// Redis cache backend using connection manager for pooling.
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Creates a new Redis cache connection.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://localhost:6379")
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();

        match ttl {
            Some(duration) => {
                // Redis EX takes whole seconds and rejects 0.
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(map_redis_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Connects to the Redis instance named by `REDIS_URL`, if any.
    ///
    /// Tests return early when no server is configured.
    async fn test_cache() -> Option<RedisCache> {
        let url = std::env::var("REDIS_URL").ok()?;
        RedisCache::new(&url).await.ok()
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let Some(cache) = test_cache().await else {
            return;
        };
        let key = "bookshelf-test:dune";

        cache
            .set(key, b"{\"name\":\"dune\"}", Some(Duration::from_secs(30)))
            .await
            .unwrap();
        assert_eq!(
            cache.get(key).await.unwrap(),
            Some(b"{\"name\":\"dune\"}".to_vec())
        );

        cache.delete(key).await.unwrap();
        assert_eq!(cache.get(key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sub_second_ttl_is_rounded_up() {
        let Some(cache) = test_cache().await else {
            return;
        };
        let key = "bookshelf-test:short";

        cache
            .set(key, b"x", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        assert!(cache.get(key).await.unwrap().is_some());
        cache.delete(key).await.unwrap();
    }
}
