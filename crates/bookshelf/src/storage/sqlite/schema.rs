//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! following the Functional Core pattern - pure data, no I/O.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Books table. Rows are soft-deleted through deleted_at, never removed.
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    isbn TEXT NOT NULL DEFAULT '',
    author TEXT NOT NULL DEFAULT '',
    version TEXT NOT NULL DEFAULT '',
    kind INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_books_kind ON books(kind);
CREATE INDEX IF NOT EXISTS idx_books_deleted_at ON books(deleted_at);
"#;

pub const INSERT_BOOK: &str = r#"
INSERT INTO books (name, isbn, author, version, kind, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const SELECT_BOOK_BY_ID: &str = r#"
SELECT id, name, isbn, author, version, kind, created_at, updated_at, deleted_at
FROM books
WHERE id = ?1
"#;

pub const SELECT_BOOK_BY_NAME: &str = r#"
SELECT id, name, isbn, author, version, kind, created_at, updated_at, deleted_at
FROM books
WHERE name = ?1 AND deleted_at IS NULL
"#;

pub const SELECT_BOOKS_BY_KIND: &str = r#"
SELECT id, name, isbn, author, version, kind, created_at, updated_at, deleted_at
FROM books
WHERE kind = ?1 AND deleted_at IS NULL
ORDER BY id ASC
"#;

/// Absent patch fields bind as NULL and keep the stored value.
pub const UPDATE_BOOK_BY_NAME: &str = r#"
UPDATE books
SET isbn = COALESCE(?2, isbn),
    author = COALESCE(?3, author),
    version = COALESCE(?4, version),
    kind = COALESCE(?5, kind),
    updated_at = ?6
WHERE name = ?1 AND deleted_at IS NULL
"#;

#[cfg(test)]
pub const SOFT_DELETE_BOOK_BY_NAME: &str = r#"
UPDATE books
SET deleted_at = ?2
WHERE name = ?1 AND deleted_at IS NULL
"#;
