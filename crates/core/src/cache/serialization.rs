//! Pure functions for serializing/deserializing books to/from cache bytes.
//!
//! Cache values are JSON so they stay human-readable when inspected with
//! `redis-cli` or a debugger.

use crate::book::Book;
use thiserror::Error;

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value to bytes.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// Failed to deserialize bytes to a value.
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serializes a book to JSON bytes.
pub fn serialize_book(book: &Book) -> Result<Vec<u8>> {
    serde_json::to_vec(book).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a book.
///
/// Any malformed payload (truncated, wrong shape, not JSON) is reported as
/// `DeserializeFailed` so callers can treat it as a corrupt cache entry.
pub fn deserialize_book(bytes: &[u8]) -> Result<Book> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}
