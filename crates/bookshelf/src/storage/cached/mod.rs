//! Cached repository decorator.
//!
//! Wraps a `BookRepository` with the cache-aside pattern:
//!
//! - **Reads**: Check cache first, on miss fetch from the store and populate the cache
//! - **Writes**: Persist to the store, then overwrite the cached copy with the committed row
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! let repo = Arc::new(SqliteRepository::new("bookshelf.db", busy_timeout).await?);
//! let cache = Arc::new(MemoryCache::new(10_000)?);
//!
//! let books = CachedBookRepository::new(repo, cache, settings_provider);
//! ```

mod book;

pub use book::{CachedBookRepository, UpdatedBook};
