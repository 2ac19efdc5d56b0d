/// Returns the cache key for a book.
///
/// With an empty prefix the key is the book name itself.
pub fn book_key(prefix: &str, name: &str) -> String {
    format!("{}{}", prefix, name)
}
