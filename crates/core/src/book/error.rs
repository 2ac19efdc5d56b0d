use thiserror::Error;

/// Errors raised when a caller-supplied book payload is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Book name cannot be empty")]
    EmptyName,
    #[error("Book name too long (max 255 characters)")]
    NameTooLong,
    #[error("Book name contains control characters")]
    InvalidName,
    #[error("Book patch has no fields to update")]
    EmptyPatch,
}
