mod error;
mod operations;
mod types;

pub use error::BookError;
pub use operations::{apply_patch, validate_name, validate_new_book, validate_patch, MAX_NAME_LEN};
pub use types::{Book, BookPatch, NewBook};
