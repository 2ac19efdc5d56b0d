//! SQLite repository implementation.
//!
//! Implements `BookRepository` from `bookshelf_core::storage` using SQLite.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::Connection;

use bookshelf_core::book::{Book, BookPatch, NewBook};
use bookshelf_core::storage::{BookRepository, RepositoryError, Result};

use super::conversions::{format_datetime, row_to_book};
use super::error::map_tokio_rusqlite_error_with_id;
use super::schema;

const ENTITY: &str = "Book";

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-based repository implementation.
///
/// All statements run on the single connection thread owned by
/// `tokio_rusqlite::Connection`.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn, busy_timeout).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn, Duration::ZERO).await?;

        Ok(Self { conn })
    }

    /// Initialize the database schema.
    async fn init_schema(conn: &Connection, busy_timeout: Duration) -> Result<()> {
        conn.call(move |conn| {
            conn.busy_timeout(busy_timeout).map_err(wrap_err)?;
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    /// Marks a live book as deleted.
    #[cfg(test)]
    async fn soft_delete(&self, name: &str) -> Result<()> {
        let key = name.to_string();
        let deleted_at = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::SOFT_DELETE_BOOK_BY_NAME,
                    rusqlite::params![key, deleted_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, ENTITY, name))
    }
}

#[async_trait]
impl BookRepository for SqliteRepository {
    async fn create_book(&self, book: &NewBook) -> Result<Book> {
        let name = book.name.clone();
        let isbn = book.isbn.clone();
        let author = book.author.clone();
        let version = book.version.clone();
        let kind = book.kind;
        let now = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_BOOK,
                    rusqlite::params![name, isbn, author, version, kind, now, now],
                )
                .map_err(wrap_err)?;
                let id = conn.last_insert_rowid();
                conn.query_row(schema::SELECT_BOOK_BY_ID, [id], row_to_book)
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, ENTITY, book.name.as_str()))
    }

    async fn get_book_by_name(&self, name: &str) -> Result<Book> {
        let key = name.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_BOOK_BY_NAME).map_err(wrap_err)?;
                stmt.query_row([&key], row_to_book).map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, ENTITY, name))
    }

    async fn list_books_by_kind(&self, kind: i64) -> Result<Vec<Book>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_BOOKS_BY_KIND)
                    .map_err(wrap_err)?;
                let rows = stmt.query_map([kind], row_to_book).map_err(wrap_err)?;

                let mut books = Vec::new();
                for row_result in rows {
                    books.push(row_result.map_err(wrap_err)?);
                }
                Ok(books)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, ENTITY, format!("kind={kind}")))
    }

    async fn update_book_by_name(&self, name: &str, patch: &BookPatch) -> Result<Book> {
        let key = name.to_string();
        let isbn = patch.isbn.clone();
        let author = patch.author.clone();
        let version = patch.version.clone();
        let kind = patch.kind;
        let now = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                // Dropping the transaction without commit rolls it back.
                let tx = conn.transaction().map_err(wrap_err)?;

                let rows = tx
                    .execute(
                        schema::UPDATE_BOOK_BY_NAME,
                        rusqlite::params![key, isbn, author, version, kind, now],
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    return Err(wrap_err(rusqlite::Error::QueryReturnedNoRows));
                }

                let book = tx
                    .query_row(schema::SELECT_BOOK_BY_NAME, [&key], row_to_book)
                    .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(book)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, ENTITY, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    async fn setup_repo() -> SqliteRepository {
        SqliteRepository::new_in_memory().await.unwrap()
    }

    fn dune() -> NewBook {
        NewBook::new("dune", 7)
            .with_isbn("978-0441013593")
            .with_author("Frank Herbert")
            .with_version("1st")
    }

    #[tokio::test]
    async fn test_create_and_get_book() {
        let repo = setup_repo().await;

        let created = repo.create_book(&dune()).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.name, "dune");
        assert_eq!(created.created_at, created.updated_at);
        assert!(!created.is_deleted());

        let fetched = repo.get_book_by_name("dune").await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_nonexistent_book() {
        let repo = setup_repo().await;

        let result = repo.get_book_by_name("missing").await;

        assert_eq!(result, Err(RepositoryError::book_not_found("missing")));
    }

    #[tokio::test]
    async fn test_create_duplicate_name() {
        let repo = setup_repo().await;
        repo.create_book(&dune()).await.unwrap();

        let result = repo.create_book(&NewBook::new("dune", 1)).await;

        assert!(matches!(
            result,
            Err(RepositoryError::AlreadyExists {
                entity_type: "Book",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_list_books_by_kind() {
        let repo = setup_repo().await;
        let a = repo.create_book(&NewBook::new("a", 1)).await.unwrap();
        repo.create_book(&NewBook::new("b", 2)).await.unwrap();
        let c = repo.create_book(&NewBook::new("c", 1)).await.unwrap();

        let books = repo.list_books_by_kind(1).await.unwrap();

        assert_eq!(books, vec![a, c]);
        assert!(repo.list_books_by_kind(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_soft_deleted_rows_are_invisible() {
        let repo = setup_repo().await;
        repo.create_book(&dune()).await.unwrap();
        repo.soft_delete("dune").await.unwrap();

        assert!(repo.get_book_by_name("dune").await.unwrap_err().is_not_found());
        assert!(repo.list_books_by_kind(7).await.unwrap().is_empty());
        let update = repo
            .update_book_by_name("dune", &BookPatch::default().with_author("X"))
            .await;
        assert!(update.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let repo = setup_repo().await;
        let created = repo.create_book(&dune()).await.unwrap();

        let patch = BookPatch::default().with_author("X").with_kind(9);
        let updated = repo.update_book_by_name("dune", &patch).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.author, "X");
        assert_eq!(updated.kind, 9);
        assert_eq!(updated.isbn, created.isbn);
        assert_eq!(updated.version, created.version);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        // The returned row is exactly what a later read sees.
        assert_eq!(repo.get_book_by_name("dune").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_nonexistent_book() {
        let repo = setup_repo().await;

        let result = repo
            .update_book_by_name("missing", &BookPatch::default().with_author("X"))
            .await;

        assert_eq!(result, Err(RepositoryError::book_not_found("missing")));
    }

    #[tokio::test]
    async fn test_file_database_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");
        let path = path.to_str().unwrap();

        {
            let repo = SqliteRepository::new(path, Duration::from_secs(1))
                .await
                .unwrap();
            repo.create_book(&dune()).await.unwrap();
        }

        let repo = SqliteRepository::new(path, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(repo.get_book_by_name("dune").await.unwrap().author, "Frank Herbert");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// For every kind, listing returns exactly the live rows of that kind in id order.
        #[test]
        fn prop_list_returns_every_live_row_in_id_order(
            kinds in proptest::collection::vec(0i64..4, 0..24),
            deleted in proptest::collection::vec(any::<bool>(), 24),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            rt.block_on(async {
                let repo = setup_repo().await;
                let mut live = Vec::new();

                for (i, kind) in kinds.iter().enumerate() {
                    let name = format!("book-{i}");
                    let book = repo.create_book(&NewBook::new(&name, *kind)).await.unwrap();
                    if deleted[i] {
                        repo.soft_delete(&name).await.unwrap();
                    } else {
                        live.push(book);
                    }
                }

                for kind in 0..4 {
                    let expected: Vec<Book> =
                        live.iter().filter(|b| b.kind == kind).cloned().collect();
                    let listed = repo.list_books_by_kind(kind).await.unwrap();
                    prop_assert_eq!(listed, expected);
                }
                Ok(())
            })?;
        }
    }
}
