use thiserror::Error;

use crate::book::BookError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// Builds a `NotFound` error for a book name.
    pub fn book_not_found(name: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            entity_type: "Book",
            id: name.into(),
        }
    }

    /// Returns true for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}

impl From<BookError> for RepositoryError {
    fn from(err: BookError) -> Self {
        RepositoryError::InvalidData(err.to_string())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::book_not_found("dune");
        assert_eq!(error.to_string(), "Book not found: dune");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_repository_error_already_exists_display() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "Book",
            id: "dune".to_string(),
        };
        assert_eq!(error.to_string(), "Book already exists: dune");
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_repository_error_connection_failed_display() {
        let error = RepositoryError::ConnectionFailed("database is locked".to_string());
        assert_eq!(error.to_string(), "Connection failed: database is locked");
    }

    #[test]
    fn test_repository_error_query_failed_display() {
        let error = RepositoryError::QueryFailed("no such table: books".to_string());
        assert_eq!(error.to_string(), "Query failed: no such table: books");
    }

    #[test]
    fn test_book_error_converts_to_invalid_data() {
        let error: RepositoryError = BookError::EmptyName.into();
        assert_eq!(
            error,
            RepositoryError::InvalidData("Book name cannot be empty".to_string())
        );
    }
}
