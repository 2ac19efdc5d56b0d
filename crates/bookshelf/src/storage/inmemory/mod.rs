//! In-memory storage backend for testing.
//!
//! This module provides an in-memory implementation of `BookRepository`
//! that keeps every row in a `HashMap` wrapped in `Arc<RwLock<_>>`. This is
//! useful for testing and development scenarios where persistence is not required.
//!
//! # Example
//!
//! ```rust,ignore
//! use bookshelf::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
