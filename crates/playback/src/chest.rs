//! Book storage seen by the core

use earshot_core::{Book, BookId, Position};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Where books live
///
/// The core reads a book when it is loaded and writes every applied
/// position change back.
pub trait BookChest: Send + Sync {
    fn book_by_id(&self, id: BookId) -> Option<Book>;

    fn update_position(&self, id: BookId, position: Position);
}

/// In-memory book chest
#[derive(Debug, Default)]
pub struct MemoryBookChest {
    books: RwLock<HashMap<BookId, Book>>,
}

impl MemoryBookChest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let chest = Self::new();
        for book in books {
            chest.insert(book);
        }
        chest
    }

    /// Adds or replaces a book
    pub fn insert(&self, book: Book) {
        self.books
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(book.id, book);
    }

    /// All books, sorted by name
    pub fn books(&self) -> Vec<Book> {
        let mut books: Vec<Book> = self
            .books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        books.sort_by(|a, b| a.name.cmp(&b.name));
        books
    }
}

impl BookChest for MemoryBookChest {
    fn book_by_id(&self, id: BookId) -> Option<Book> {
        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn update_position(&self, id: BookId, position: Position) {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        match books.get_mut(&id) {
            Some(book) => {
                if let Err(e) = book.set_position(position) {
                    log::warn!("Not storing position for {}: {}", id, e);
                }
            }
            None => log::warn!("Not storing position for unknown book {}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earshot_core::Chapter;

    fn book(name: &str) -> Book {
        Book::new(
            name,
            vec![
                Chapter::new("One", "/a/1.mp3", 10_000),
                Chapter::new("Two", "/a/2.mp3", 20_000),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let book = book("Dune");
        let id = book.id;
        let chest = MemoryBookChest::with_books([book]);

        assert_eq!(chest.book_by_id(id).map(|b| b.name), Some("Dune".to_string()));
        assert!(chest.book_by_id(BookId::new()).is_none());
    }

    #[test]
    fn test_update_position_persists() {
        let book = book("Dune");
        let id = book.id;
        let chest = MemoryBookChest::with_books([book]);

        chest.update_position(id, Position::new(1, 5_000));
        assert_eq!(chest.book_by_id(id).unwrap().position(), Position::new(1, 5_000));
    }

    #[test]
    fn test_update_position_rejects_invalid() {
        let book = book("Dune");
        let id = book.id;
        let chest = MemoryBookChest::with_books([book]);

        chest.update_position(id, Position::new(0, 99_000));
        assert_eq!(chest.book_by_id(id).unwrap().position(), Position::start());
    }

    #[test]
    fn test_books_sorted_by_name() {
        let chest = MemoryBookChest::with_books([book("Neuromancer"), book("Dune")]);
        let names: Vec<String> = chest.books().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["Dune", "Neuromancer"]);
    }
}
