//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use bookshelf_core::book::Book;
use chrono::{DateTime, Utc};
use rusqlite::Row;

/// Convert a SQLite row to a Book.
///
/// Expected columns: id, name, isbn, author, version, kind, created_at, updated_at, deleted_at
pub fn row_to_book(row: &Row) -> rusqlite::Result<Book> {
    let id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    let isbn: String = row.get(2)?;
    let author: String = row.get(3)?;
    let version: String = row.get(4)?;
    let kind: i64 = row.get(5)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    let deleted_at: Option<String> = row.get(8)?;

    Ok(Book {
        id,
        name,
        isbn,
        author,
        version,
        kind,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
        deleted_at: deleted_at.as_deref().map(parse_datetime).transpose()?,
    })
}

/// Parse an RFC 3339 timestamp stored as TEXT.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Format a DateTime for SQLite storage (RFC 3339).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
