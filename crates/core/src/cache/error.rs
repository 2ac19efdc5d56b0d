use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// A missing key is not an error: `Cache::get` reports it as `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    /// Returns true if the cache could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CacheError::ConnectionFailed(_) | CacheError::Timeout(_))
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failed_display() {
        let error = CacheError::ConnectionFailed("timeout".to_string());
        assert_eq!(error.to_string(), "Cache connection failed: timeout");
    }

    #[test]
    fn test_timeout_display() {
        let error = CacheError::Timeout(Duration::from_millis(250));
        assert_eq!(error.to_string(), "Cache operation timed out after 250ms");
    }

    #[test]
    fn test_operation_failed_display() {
        let error = CacheError::OperationFailed("WRONGTYPE".to_string());
        assert_eq!(error.to_string(), "Cache operation failed: WRONGTYPE");
    }

    #[test]
    fn test_serialization_display() {
        let error = CacheError::Serialization("invalid JSON".to_string());
        assert_eq!(error.to_string(), "Serialization error: invalid JSON");
    }

    #[test]
    fn test_is_unavailable() {
        assert!(CacheError::ConnectionFailed("refused".to_string()).is_unavailable());
        assert!(CacheError::Timeout(Duration::from_secs(1)).is_unavailable());
        assert!(!CacheError::OperationFailed("oops".to_string()).is_unavailable());
        assert!(!CacheError::Serialization("bad".to_string()).is_unavailable());
    }
}
