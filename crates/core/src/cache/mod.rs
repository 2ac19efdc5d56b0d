mod error;
mod keys;
mod serialization;
mod traits;
mod ttl;

pub use error::{CacheError, Result};
pub use keys::book_key;
pub use serialization::{deserialize_book, serialize_book, SerializationError};
pub use traits::Cache;
pub use ttl::{TtlPolicy, DEFAULT_TTL_BASE, DEFAULT_TTL_JITTER, MAX_TTL};
