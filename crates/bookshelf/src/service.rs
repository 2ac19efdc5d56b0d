//! Book service: the operation set exposed to callers.
//!
//! The trait is sealed and its only implementation is private to this
//! module; callers get one from [`book_service`].

use std::sync::Arc;

use async_trait::async_trait;

use bookshelf_core::book::{Book, BookPatch, NewBook};
use bookshelf_core::cache::Cache;
use bookshelf_core::storage::{BookRepository, Result};

use crate::storage::cached::{CachedBookRepository, UpdatedBook};

/// Book lookups and writes, backed by the cache-aside repository.
#[async_trait]
pub trait BookService: private::Sealed + Send + Sync {
    /// Returns the live book called `name`.
    async fn find_book_by_name(&self, name: &str) -> Result<Book>;

    /// Returns every live book of `kind`, ordered by id.
    async fn list_books_by_kind(&self, kind: i64) -> Result<Vec<Book>>;

    /// Creates a book.
    async fn save_book(&self, book: &NewBook) -> Result<Book>;

    /// Patches the live book called `name`.
    async fn update_book(&self, name: &str, patch: &BookPatch) -> Result<UpdatedBook>;
}

/// Builds the service around a cached repository.
pub fn book_service<R, C>(repository: CachedBookRepository<R, C>) -> Arc<dyn BookService>
where
    R: BookRepository + 'static,
    C: Cache + 'static,
{
    Arc::new(Books { repository })
}

struct Books<R, C>
where
    R: BookRepository,
    C: Cache,
{
    repository: CachedBookRepository<R, C>,
}

#[async_trait]
impl<R, C> BookService for Books<R, C>
where
    R: BookRepository + 'static,
    C: Cache + 'static,
{
    async fn find_book_by_name(&self, name: &str) -> Result<Book> {
        self.repository.get_by_name(name).await
    }

    async fn list_books_by_kind(&self, kind: i64) -> Result<Vec<Book>> {
        self.repository.list_by_kind(kind).await
    }

    async fn save_book(&self, book: &NewBook) -> Result<Book> {
        self.repository.save(book).await
    }

    async fn update_book(&self, name: &str, patch: &BookPatch) -> Result<UpdatedBook> {
        self.repository.update_by_name(name, patch).await
    }
}

mod private {
    use bookshelf_core::cache::Cache;
    use bookshelf_core::storage::BookRepository;

    pub trait Sealed {}

    impl<R, C> Sealed for super::Books<R, C>
    where
        R: BookRepository,
        C: Cache,
    {
    }
}
