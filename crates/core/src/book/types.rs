use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A book record as persisted by the durable store.
///
/// `name` is the unique, immutable lookup key. `id`, the timestamps and the
/// soft-delete marker are managed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub isbn: String,
    pub author: String,
    pub version: String,
    /// Category the book is listed under.
    pub kind: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Returns true if the row carries a soft-delete marker.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Payload for creating a book. The store assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub name: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
    pub kind: i64,
}

impl NewBook {
    /// Creates a payload with a name and kind; the other fields are empty.
    pub fn new(name: impl Into<String>, kind: i64) -> Self {
        Self {
            name: name.into(),
            isbn: String::new(),
            author: String::new(),
            version: String::new(),
            kind,
        }
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = isbn.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Partial update of a book. Absent fields are left unchanged.
///
/// The name is deliberately missing: it is the key and never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
}

impl BookPatch {
    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_kind(mut self, kind: i64) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Returns true if the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.isbn.is_none() && self.author.is_none() && self.version.is_none() && self.kind.is_none()
    }
}
