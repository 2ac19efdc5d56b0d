//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use bookshelf_core::book::{apply_patch, Book, BookPatch, NewBook};
use bookshelf_core::storage::{BookRepository, RepositoryError, Result};

/// Rows keyed by name, plus the id sequence.
#[derive(Debug, Default)]
struct Table {
    rows: HashMap<String, Book>,
    last_id: i64,
}

/// In-memory storage backend for testing.
///
/// Uses a HashMap wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a live book as deleted.
    #[cfg(test)]
    async fn soft_delete(&self, name: &str) {
        let mut table = self.table.write().await;
        if let Some(book) = table.rows.get_mut(name) {
            book.deleted_at = Some(Utc::now());
        }
    }
}

#[async_trait]
impl BookRepository for InMemoryRepository {
    async fn create_book(&self, book: &NewBook) -> Result<Book> {
        let mut table = self.table.write().await;
        // Names stay unique even against soft-deleted rows.
        if table.rows.contains_key(&book.name) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Book",
                id: book.name.clone(),
            });
        }

        table.last_id += 1;
        let now = Utc::now();
        let stored = Book {
            id: table.last_id,
            name: book.name.clone(),
            isbn: book.isbn.clone(),
            author: book.author.clone(),
            version: book.version.clone(),
            kind: book.kind,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.insert(stored.name.clone(), stored.clone());
        Ok(stored)
    }

    async fn get_book_by_name(&self, name: &str) -> Result<Book> {
        let table = self.table.read().await;
        table
            .rows
            .get(name)
            .filter(|book| !book.is_deleted())
            .cloned()
            .ok_or_else(|| RepositoryError::book_not_found(name))
    }

    async fn list_books_by_kind(&self, kind: i64) -> Result<Vec<Book>> {
        let table = self.table.read().await;
        let mut books: Vec<Book> = table
            .rows
            .values()
            .filter(|book| book.kind == kind && !book.is_deleted())
            .cloned()
            .collect();
        books.sort_by_key(|book| book.id);
        Ok(books)
    }

    async fn update_book_by_name(&self, name: &str, patch: &BookPatch) -> Result<Book> {
        let mut table = self.table.write().await;
        let current = table
            .rows
            .get_mut(name)
            .filter(|book| !book.is_deleted())
            .ok_or_else(|| RepositoryError::book_not_found(name))?;

        *current = apply_patch(current, patch, Utc::now());
        Ok(current.clone())
    }
}
