use chrono::{DateTime, Utc};

use super::error::BookError;
use super::types::{Book, BookPatch, NewBook};

/// Longest accepted book name, in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Validates a lookup key before any I/O happens.
pub fn validate_name(name: &str) -> Result<(), BookError> {
    if name.trim().is_empty() {
        return Err(BookError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(BookError::NameTooLong);
    }
    if name.chars().any(char::is_control) {
        return Err(BookError::InvalidName);
    }
    Ok(())
}

/// Validates a create payload.
pub fn validate_new_book(book: &NewBook) -> Result<(), BookError> {
    validate_name(&book.name)
}

/// Validates an update payload.
pub fn validate_patch(patch: &BookPatch) -> Result<(), BookError> {
    if patch.is_empty() {
        return Err(BookError::EmptyPatch);
    }
    Ok(())
}

/// Applies a patch to a book, bumping `updated_at`.
pub fn apply_patch(book: &Book, patch: &BookPatch, now: DateTime<Utc>) -> Book {
    let mut updated = book.clone();
    if let Some(isbn) = &patch.isbn {
        updated.isbn = isbn.clone();
    }
    if let Some(author) = &patch.author {
        updated.author = author.clone();
    }
    if let Some(version) = &patch.version {
        updated.version = version.clone();
    }
    if let Some(kind) = patch.kind {
        updated.kind = kind;
    }
    updated.updated_at = now;
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()
    }

    fn dune() -> Book {
        Book {
            id: 1,
            name: "dune".to_string(),
            isbn: "978-0441013593".to_string(),
            author: "Frank Herbert".to_string(),
            version: "1st".to_string(),
            kind: 7,
            created_at: fixed_timestamp(),
            updated_at: fixed_timestamp(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_validate_name_accepts_regular_names() {
        assert_eq!(validate_name("dune"), Ok(()));
        assert_eq!(validate_name("The Left Hand of Darkness"), Ok(()));
        assert_eq!(validate_name("三体"), Ok(()));
    }

    #[test]
    fn test_validate_name_rejects_empty_and_blank() {
        assert_eq!(validate_name(""), Err(BookError::EmptyName));
        assert_eq!(validate_name("   "), Err(BookError::EmptyName));
    }

    #[test]
    fn test_validate_name_rejects_long_names() {
        let name = "a".repeat(MAX_NAME_LEN + 1);
        assert_eq!(validate_name(&name), Err(BookError::NameTooLong));
        assert_eq!(validate_name(&"a".repeat(MAX_NAME_LEN)), Ok(()));
    }

    #[test]
    fn test_validate_name_rejects_control_characters() {
        assert_eq!(validate_name("du\nne"), Err(BookError::InvalidName));
        assert_eq!(validate_name("dune\0"), Err(BookError::InvalidName));
    }

    #[test]
    fn test_validate_new_book_checks_name() {
        assert_eq!(validate_new_book(&NewBook::new("dune", 7)), Ok(()));
        assert_eq!(
            validate_new_book(&NewBook::new("", 7)),
            Err(BookError::EmptyName)
        );
    }

    #[test]
    fn test_validate_patch_rejects_empty() {
        assert_eq!(validate_patch(&BookPatch::default()), Err(BookError::EmptyPatch));
        assert_eq!(validate_patch(&BookPatch::default().with_kind(8)), Ok(()));
    }

    #[test]
    fn test_apply_patch_changes_only_present_fields() {
        let later = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();
        let patch = BookPatch::default().with_kind(8).with_version("2nd");

        let updated = apply_patch(&dune(), &patch, later);

        assert_eq!(updated.kind, 8);
        assert_eq!(updated.version, "2nd");
        assert_eq!(updated.isbn, "978-0441013593");
        assert_eq!(updated.author, "Frank Herbert");
        assert_eq!(updated.name, "dune");
        assert_eq!(updated.id, 1);
        assert_eq!(updated.created_at, fixed_timestamp());
        assert_eq!(updated.updated_at, later);
    }
}
