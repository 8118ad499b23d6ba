//! Bookmark domain model

use crate::types::{BookId, Position, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a bookmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookmarkId(Uuid);

impl BookmarkId {
    /// Creates a new random BookmarkId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BookmarkId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A labelled position in a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub book_id: BookId,
    pub position: Position,
    pub title: String,
    pub created_at: Timestamp,
}

impl Bookmark {
    /// Creates a new bookmark at the specified position
    pub fn new(book_id: BookId, position: Position, title: impl Into<String>) -> Self {
        Self {
            id: BookmarkId::new(),
            book_id,
            position,
            title: title.into(),
            created_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bookmark_new() {
        let book_id = BookId::new();
        let bookmark = Bookmark::new(book_id, Position::new(2, 4000), "Good part");

        assert_eq!(bookmark.book_id, book_id);
        assert_eq!(bookmark.position, Position::new(2, 4000));
        assert_eq!(bookmark.title, "Good part");
    }

    #[test]
    fn test_bookmark_ids_are_unique() {
        let book_id = BookId::new();
        let a = Bookmark::new(book_id, Position::start(), "a");
        let b = Bookmark::new(book_id, Position::start(), "b");
        assert_ne!(a.id, b.id);
    }
}
