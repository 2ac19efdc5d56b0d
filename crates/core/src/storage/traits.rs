use async_trait::async_trait;

use crate::book::{Book, BookPatch, NewBook};

use super::Result;

/// Durable store for books, keyed by the unique book name.
///
/// Implementations perform one round trip per call and never retry or
/// cache. Soft-deleted rows are invisible to every method.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Inserts a book and returns the stored row with its id and timestamps.
    async fn create_book(&self, book: &NewBook) -> Result<Book>;

    /// Gets a book by name, failing with `NotFound` when no row matches.
    async fn get_book_by_name(&self, name: &str) -> Result<Book>;

    /// Lists every book of a kind, ordered by id.
    async fn list_books_by_kind(&self, kind: i64) -> Result<Vec<Book>>;

    /// Applies a patch in a single transaction and returns the committed row.
    ///
    /// Nothing is written when the call fails.
    async fn update_book_by_name(&self, name: &str, patch: &BookPatch) -> Result<Book>;
}
