//! Bookmark persistence seen by the core

use earshot_core::{BookId, Bookmark, Position};
use std::sync::{Mutex, PoisonError};

pub trait BookmarkProvider: Send + Sync {
    /// Stores a new bookmark and returns it
    fn add_bookmark_at_position(&self, book_id: BookId, position: Position, title: &str)
        -> Bookmark;

    /// Bookmarks of one book, in creation order
    fn bookmarks_for(&self, book_id: BookId) -> Vec<Bookmark>;
}

/// In-memory bookmark store
#[derive(Debug, Default)]
pub struct MemoryBookmarks {
    bookmarks: Mutex<Vec<Bookmark>>,
}

impl MemoryBookmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Bookmark>> {
        self.bookmarks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BookmarkProvider for MemoryBookmarks {
    fn add_bookmark_at_position(
        &self,
        book_id: BookId,
        position: Position,
        title: &str,
    ) -> Bookmark {
        let bookmark = Bookmark::new(book_id, position, title);
        log::debug!("Bookmark '{}' at {} for {}", title, position, book_id);
        self.lock().push(bookmark.clone());
        bookmark
    }

    fn bookmarks_for(&self, book_id: BookId) -> Vec<Bookmark> {
        self.lock()
            .iter()
            .filter(|b| b.book_id == book_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_list() {
        let store = MemoryBookmarks::new();
        let book = BookId::new();
        let other = BookId::new();

        store.add_bookmark_at_position(book, Position::new(0, 1_000), "first");
        store.add_bookmark_at_position(other, Position::start(), "elsewhere");
        let second = store.add_bookmark_at_position(book, Position::new(2, 0), "second");

        let titles: Vec<String> = store
            .bookmarks_for(book)
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["first", "second"]);
        assert_eq!(second.position, Position::new(2, 0));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_empty() {
        let store = MemoryBookmarks::new();
        assert!(store.is_empty());
        assert!(store.bookmarks_for(BookId::new()).is_empty());
    }
}
