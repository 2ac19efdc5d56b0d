//! Application state.
//!
//! Opens the store and the cache once at startup and wires them into the
//! book service. The backend combination is chosen by feature flags.

use std::sync::Arc;

use crate::service::BookService;
use crate::settings::SettingsProvider;

/// Shared application state.
///
/// Cheap to clone; every clone talks to the same store, cache and settings.
#[derive(Clone)]
pub struct AppState {
    /// Book operations (cache-aside over the durable store).
    pub books: Arc<dyn BookService>,
    /// Current settings, swapped on reload.
    pub settings: SettingsProvider,
}

// ============================================================================
// Factory functions for different backend combinations
// ============================================================================

#[cfg(all(feature = "sqlite", feature = "memory"))]
mod sqlite_memory {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use crate::service::book_service;
    use crate::storage::cached::CachedBookRepository;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage and in-memory cache.
        pub async fn new(settings: SettingsProvider) -> Result<Self, anyhow::Error> {
            let snapshot = settings.snapshot();
            let sqlite_repo = Arc::new(
                SqliteRepository::new(&snapshot.store.sqlite_path, snapshot.busy_timeout()).await?,
            );
            let memory_cache = Arc::new(MemoryCache::new(snapshot.cache.max_entries)?);

            tracing::info!(
                sqlite_path = %snapshot.store.sqlite_path,
                max_entries = snapshot.cache.max_entries,
                "Using SQLite storage with in-memory cache"
            );

            let repository = CachedBookRepository::new(sqlite_repo, memory_cache, settings.clone());
            Ok(Self {
                books: book_service(repository),
                settings,
            })
        }
    }
}

#[cfg(all(feature = "sqlite", feature = "redis"))]
mod sqlite_redis {
    use super::*;
    use crate::cache::redis_impl::RedisCache;
    use crate::service::book_service;
    use crate::storage::cached::CachedBookRepository;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage and Redis cache.
        pub async fn new(settings: SettingsProvider) -> Result<Self, anyhow::Error> {
            let snapshot = settings.snapshot();
            let sqlite_repo = Arc::new(
                SqliteRepository::new(&snapshot.store.sqlite_path, snapshot.busy_timeout()).await?,
            );
            let redis_cache = Arc::new(RedisCache::new(&snapshot.cache.redis_url).await?);

            tracing::info!(
                sqlite_path = %snapshot.store.sqlite_path,
                redis_url = %snapshot.cache.redis_url,
                "Using SQLite storage with Redis cache"
            );

            let repository = CachedBookRepository::new(sqlite_repo, redis_cache, settings.clone());
            Ok(Self {
                books: book_service(repository),
                settings,
            })
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "memory"))]
mod inmemory_memory {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use crate::service::book_service;
    use crate::storage::cached::CachedBookRepository;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage and in-memory cache.
        pub async fn new(settings: SettingsProvider) -> Result<Self, anyhow::Error> {
            let snapshot = settings.snapshot();
            let inmemory_repo = Arc::new(InMemoryRepository::new());
            let memory_cache = Arc::new(MemoryCache::new(snapshot.cache.max_entries)?);

            tracing::info!(
                max_entries = snapshot.cache.max_entries,
                "Using in-memory storage with in-memory cache"
            );

            let repository =
                CachedBookRepository::new(inmemory_repo, memory_cache, settings.clone());
            Ok(Self {
                books: book_service(repository),
                settings,
            })
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "redis"))]
mod inmemory_redis {
    use super::*;
    use crate::cache::redis_impl::RedisCache;
    use crate::service::book_service;
    use crate::storage::cached::CachedBookRepository;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage and Redis cache.
        pub async fn new(settings: SettingsProvider) -> Result<Self, anyhow::Error> {
            let snapshot = settings.snapshot();
            let inmemory_repo = Arc::new(InMemoryRepository::new());
            let redis_cache = Arc::new(RedisCache::new(&snapshot.cache.redis_url).await?);

            tracing::info!(
                redis_url = %snapshot.cache.redis_url,
                "Using in-memory storage with Redis cache"
            );

            let repository =
                CachedBookRepository::new(inmemory_repo, redis_cache, settings.clone());
            Ok(Self {
                books: book_service(repository),
                settings,
            })
        }
    }
}
