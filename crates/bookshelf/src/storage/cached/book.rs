//! Cached book repository decorator.
//!
//! Wraps a `BookRepository` implementation with the cache-aside pattern.
//! Cache faults never fail an operation the store completed: reads fall back
//! to the store and writes report the cache error next to the stored row.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::task::JoinHandle;

use bookshelf_core::book::{validate_name, validate_new_book, validate_patch, Book, BookPatch, NewBook};
use bookshelf_core::cache::{
    book_key, deserialize_book, serialize_book, Cache, CacheError, Result as CacheResult,
    TtlPolicy,
};
use bookshelf_core::storage::{BookRepository, RepositoryError, Result};

use crate::config::Settings;
use crate::settings::SettingsProvider;

/// Result of a committed update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedBook {
    /// The row as committed by the store.
    pub book: Book,
    /// Set when the write-through to the cache failed.
    pub cache_error: Option<CacheError>,
}

/// Cached book repository decorator.
///
/// Implements the cache-aside pattern:
/// - **Reads**: Check cache first, on miss fetch from the store and populate cache
/// - **Creates**: Persist only; the first read populates the cache
/// - **Updates**: Persist, then overwrite the cache entry with the committed row
/// - **Lists**: Always served by the store
///
/// Settings are read once per call, so a reloaded TTL policy or timeout
/// applies from the next operation on.
///
/// # Type Parameters
///
/// * `R` - The underlying repository implementation
/// * `C` - The cache implementation
pub struct CachedBookRepository<R, C>
where
    R: BookRepository,
    C: Cache,
{
    repository: Arc<R>,
    cache: Arc<C>,
    settings: SettingsProvider,
    rng: Arc<Mutex<StdRng>>,
}

impl<R, C> Clone for CachedBookRepository<R, C>
where
    R: BookRepository,
    C: Cache,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            settings: self.settings.clone(),
            rng: Arc::clone(&self.rng),
        }
    }
}

impl<R, C> CachedBookRepository<R, C>
where
    R: BookRepository + 'static,
    C: Cache + 'static,
{
    /// Creates a new cached book repository.
    ///
    /// # Arguments
    ///
    /// * `repository` - The underlying repository to cache
    /// * `cache` - The cache implementation
    /// * `settings` - Source of the TTL policy, call timeout and key prefix
    pub fn new(repository: Arc<R>, cache: Arc<C>, settings: SettingsProvider) -> Self {
        Self {
            repository,
            cache,
            settings,
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
        }
    }

    /// Replaces the TTL jitter source.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Arc::new(Mutex::new(rng));
        self
    }

    /// Looks a book up by name, cache first.
    ///
    /// A corrupt cache entry is treated as a miss. On a store hit the cache
    /// is populated; a failed populate is logged and does not fail the read.
    pub async fn get_by_name(&self, name: &str) -> Result<Book> {
        validate_name(name)?;

        let settings = self.settings.snapshot();
        let key = book_key(&settings.cache.key_prefix, name);

        let mut corrupt = false;
        match bounded(settings.cache_timeout(), self.cache.get(&key)).await {
            Ok(Some(bytes)) => match deserialize_book(&bytes) {
                Ok(book) => {
                    tracing::trace!(name = %name, "Cache hit for book");
                    return Ok(book);
                }
                Err(err) => {
                    tracing::warn!(name = %name, error = %err, "Cache book deserialization failed");
                    corrupt = true;
                }
            },
            Ok(None) => tracing::trace!(name = %name, "Cache miss for book"),
            Err(err) => {
                tracing::warn!(name = %name, error = %err, "Cache read failed, using store")
            }
        }

        let book = match self.repository.get_book_by_name(name).await {
            Ok(book) => book,
            Err(err) => {
                if corrupt && err.is_not_found() {
                    self.spawn_evict(key, Arc::clone(&settings)).await;
                }
                return Err(err);
            }
        };

        self.spawn_populate(key, book.clone(), settings).await;
        Ok(book)
    }

    /// Lists the live books of one kind, ordered by id. Never cached.
    pub async fn list_by_kind(&self, kind: i64) -> Result<Vec<Book>> {
        self.repository.list_books_by_kind(kind).await
    }

    /// Creates a book. The cache is populated lazily by the first read.
    pub async fn save(&self, book: &NewBook) -> Result<Book> {
        validate_new_book(book)?;

        let stored = self.repository.create_book(book).await?;
        tracing::debug!(name = %stored.name, id = stored.id, "Book created");
        Ok(stored)
    }

    /// Applies `patch` to the live book called `name`, then writes the
    /// committed row through to the cache.
    ///
    /// The commit and the write-through run on a spawned task, so dropping
    /// the returned future after the commit does not skip the cache write.
    pub async fn update_by_name(&self, name: &str, patch: &BookPatch) -> Result<UpdatedBook> {
        validate_name(name)?;
        validate_patch(patch)?;

        let this = self.clone();
        let name = name.to_string();
        let patch = patch.clone();
        let task = tokio::spawn(async move { this.commit_and_write_through(&name, &patch).await });

        join(task).await
    }

    async fn commit_and_write_through(&self, name: &str, patch: &BookPatch) -> Result<UpdatedBook> {
        let book = match self.repository.update_book_by_name(name, patch).await {
            Ok(book) => book,
            Err(err) => {
                tracing::debug!(name = %name, error = %err, "Book update rejected by store");
                return Err(err);
            }
        };

        let settings = self.settings.snapshot();
        let key = book_key(&settings.cache.key_prefix, name);
        let cache_error = match self.write(&key, &book, &settings).await {
            Ok(()) => {
                tracing::debug!(name = %name, "Book updated and cached");
                None
            }
            Err(err) => {
                tracing::warn!(name = %name, error = %err, "Failed to write updated book to cache");
                Some(err)
            }
        };

        Ok(UpdatedBook { book, cache_error })
    }

    /// Populates the cache from a spawned task and waits for it.
    async fn spawn_populate(&self, key: String, book: Book, settings: Arc<Settings>) {
        let this = self.clone();
        run_detached(async move {
            match this.write(&key, &book, &settings).await {
                Ok(()) => tracing::debug!(key = %key, "Cached book"),
                Err(err) => tracing::warn!(key = %key, error = %err, "Failed to cache book"),
            }
        })
        .await;
    }

    /// Drops a corrupt entry whose book no longer exists.
    async fn spawn_evict(&self, key: String, settings: Arc<Settings>) {
        let cache = Arc::clone(&self.cache);
        run_detached(async move {
            match bounded(settings.cache_timeout(), cache.delete(&key)).await {
                Ok(()) => tracing::debug!(key = %key, "Removed corrupt cache entry"),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "Failed to remove corrupt cache entry")
                }
            }
        })
        .await;
    }

    async fn write(&self, key: &str, book: &Book, settings: &Settings) -> CacheResult<()> {
        let bytes = serialize_book(book).map_err(|e| CacheError::Serialization(e.to_string()))?;
        let ttl = self.draw_ttl(settings.ttl_policy());
        bounded(settings.cache_timeout(), self.cache.set(key, &bytes, Some(ttl))).await
    }

    fn draw_ttl(&self, policy: TtlPolicy) -> Duration {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        policy.draw(&mut *rng)
    }
}

/// Bounds a cache call; elapsing counts as the cache being unavailable.
async fn bounded<T, F>(limit: Duration, call: F) -> CacheResult<T>
where
    F: Future<Output = CacheResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(CacheError::Timeout(limit)),
    }
}

/// Runs `work` on its own task so it completes even if the caller is dropped.
async fn run_detached<F>(work: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Err(err) = tokio::spawn(work).await {
        tracing::error!(error = %err, "Cache task failed");
    }
}

async fn join<T>(task: JoinHandle<Result<T>>) -> Result<T> {
    task.await
        .map_err(|err| RepositoryError::QueryFailed(format!("Book task failed: {err}")))?
}
