//! Functional core for the bookshelf service.
//!
//! Pure types, contracts and policies shared by the storage and cache
//! adapters. Nothing in this crate performs I/O.

pub mod book;
pub mod cache;
pub mod storage;
