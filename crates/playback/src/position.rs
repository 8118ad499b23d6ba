//! Per-book playback positions
//!
//! The tracker keeps each known book's chapter durations so that every
//! position it accepts is inside the book. Changes are published as
//! [`PositionChange`] events which subscribers may filter by book.

use crate::error::{InvalidRequest, PlaybackError, PlaybackResult};
use crate::observer::{Publisher, Subscription};
use earshot_core::{Book, BookId, Position};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// A book's position moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionChange {
    pub book_id: BookId,
    pub position: Position,
}

#[derive(Debug)]
struct TrackedBook {
    chapter_durations: Vec<u64>,
    position: Position,
}

impl TrackedBook {
    fn check(&self, chapter_index: usize, offset_ms: i64) -> Result<Position, InvalidRequest> {
        if offset_ms < 0 {
            return Err(InvalidRequest::NegativeOffset(offset_ms));
        }
        let offset_ms = offset_ms as u64;

        let duration_ms = *self.chapter_durations.get(chapter_index).ok_or(
            InvalidRequest::ChapterOutOfRange {
                index: chapter_index,
                count: self.chapter_durations.len(),
            },
        )?;

        if offset_ms > duration_ms {
            return Err(InvalidRequest::OffsetPastEnd {
                offset_ms,
                duration_ms,
            });
        }

        Ok(Position::new(chapter_index, offset_ms))
    }
}

pub struct PositionTracker {
    books: RwLock<HashMap<BookId, TrackedBook>>,
    publisher: Publisher<PositionChange>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
            publisher: Publisher::new(),
        }
    }

    /// Starts tracking `book` at its persisted position
    ///
    /// Re-tracking a known book replaces its chapters and position.
    pub fn track(&self, book: &Book) {
        let tracked = TrackedBook {
            chapter_durations: book.chapters().iter().map(|c| c.duration_ms).collect(),
            position: book.position(),
        };

        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        books.insert(book.id, tracked);
        self.publisher.publish(&PositionChange {
            book_id: book.id,
            position: book.position(),
        });
    }

    pub fn is_tracked(&self, book_id: BookId) -> bool {
        self.read().contains_key(&book_id)
    }

    pub fn chapter_count(&self, book_id: BookId) -> Option<usize> {
        self.read().get(&book_id).map(|b| b.chapter_durations.len())
    }

    pub fn chapter_duration(&self, book_id: BookId, chapter_index: usize) -> Option<u64> {
        self.read()
            .get(&book_id)
            .and_then(|b| b.chapter_durations.get(chapter_index).copied())
    }

    /// Checks a position without changing anything
    pub fn validate(
        &self,
        book_id: BookId,
        chapter_index: usize,
        offset_ms: i64,
    ) -> PlaybackResult<Position> {
        let books = self.read();
        let book = books
            .get(&book_id)
            .ok_or(PlaybackError::UnknownBook(book_id))?;
        Ok(book.check(chapter_index, offset_ms)?)
    }

    /// Moves a book to `(chapter_index, offset_ms)` and notifies subscribers
    ///
    /// Invalid positions leave the stored position untouched. Setting the
    /// same position twice notifies twice.
    pub fn set_position(
        &self,
        book_id: BookId,
        chapter_index: usize,
        offset_ms: i64,
    ) -> PlaybackResult<Position> {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        let book = books
            .get_mut(&book_id)
            .ok_or(PlaybackError::UnknownBook(book_id))?;

        let position = book.check(chapter_index, offset_ms)?;
        book.position = position;

        // published under the write lock so notifications follow write order
        self.publisher.publish(&PositionChange { book_id, position });
        Ok(position)
    }

    /// Last known position of a book, `None` if it is not tracked
    pub fn current_position(&self, book_id: BookId) -> Option<Position> {
        self.read().get(&book_id).map(|b| b.position)
    }

    /// Subscribes to one book's changes, or to every book with `None`
    pub fn subscribe(&self, book_id: Option<BookId>) -> Subscription<PositionChange> {
        match book_id {
            Some(id) => self
                .publisher
                .subscribe_filtered(move |change: &PositionChange| change.book_id == id),
            None => self.publisher.subscribe(),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<BookId, TrackedBook>> {
        self.books.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earshot_core::Chapter;

    fn book_b() -> Book {
        Book::new(
            "B",
            vec![
                Chapter::new("1", "/b/1.mp3", 60_000),
                Chapter::new("2", "/b/2.mp3", 120_000),
                Chapter::new("3", "/b/3.mp3", 30_000),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_set_then_current_returns_same_value() {
        let tracker = PositionTracker::new();
        let book = book_b();
        tracker.track(&book);

        for (chapter, duration) in [(0usize, 60_000i64), (1, 120_000), (2, 30_000)] {
            for offset in [0, 1, duration / 2, duration] {
                tracker.set_position(book.id, chapter, offset).unwrap();
                assert_eq!(
                    tracker.current_position(book.id),
                    Some(Position::new(chapter, offset as u64))
                );
            }
        }
    }

    #[test]
    fn test_rejected_positions_leave_state_unchanged() {
        let tracker = PositionTracker::new();
        let book = book_b();
        tracker.track(&book);
        tracker.set_position(book.id, 1, 5_000).unwrap();

        let past_end = tracker.set_position(book.id, 1, 150_000).unwrap_err();
        assert!(past_end.is_invalid_position());

        let negative = tracker.set_position(book.id, 1, -1).unwrap_err();
        assert_eq!(
            negative,
            PlaybackError::InvalidRequest(InvalidRequest::NegativeOffset(-1))
        );

        let out_of_range = tracker.set_position(book.id, 3, 0).unwrap_err();
        assert_eq!(
            out_of_range,
            PlaybackError::InvalidRequest(InvalidRequest::ChapterOutOfRange { index: 3, count: 3 })
        );

        assert_eq!(tracker.current_position(book.id), Some(Position::new(1, 5_000)));
    }

    #[test]
    fn test_unknown_book() {
        let tracker = PositionTracker::new();
        let id = BookId::new();

        assert_eq!(tracker.current_position(id), None);
        assert_eq!(
            tracker.set_position(id, 0, 0),
            Err(PlaybackError::UnknownBook(id))
        );
    }

    #[test]
    fn test_duplicate_positions_notify_twice() {
        let tracker = PositionTracker::new();
        let book = book_b();
        tracker.track(&book);
        let sub = tracker.subscribe(Some(book.id));

        tracker.set_position(book.id, 0, 1_000).unwrap();
        tracker.set_position(book.id, 0, 1_000).unwrap();

        assert_eq!(sub.drain().len(), 2);
    }

    #[test]
    fn test_subscription_filtered_by_book() {
        let tracker = PositionTracker::new();
        let first = book_b();
        let second = book_b();
        tracker.track(&first);
        tracker.track(&second);

        let only_first = tracker.subscribe(Some(first.id));
        let everything = tracker.subscribe(None);

        tracker.set_position(second.id, 2, 10).unwrap();
        tracker.set_position(first.id, 1, 20).unwrap();

        let changes = only_first.drain();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].book_id, first.id);
        assert_eq!(changes[0].position, Position::new(1, 20));
        assert_eq!(everything.drain().len(), 2);
    }

    #[test]
    fn test_validate_does_not_write_or_notify() {
        let tracker = PositionTracker::new();
        let book = book_b();
        tracker.track(&book);
        let sub = tracker.subscribe(None);

        assert_eq!(tracker.validate(book.id, 2, 30_000), Ok(Position::new(2, 30_000)));
        assert_eq!(tracker.current_position(book.id), Some(Position::start()));
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_chapter_queries() {
        let tracker = PositionTracker::new();
        let book = book_b();
        tracker.track(&book);

        assert!(tracker.is_tracked(book.id));
        assert_eq!(tracker.chapter_count(book.id), Some(3));
        assert_eq!(tracker.chapter_duration(book.id, 1), Some(120_000));
        assert_eq!(tracker.chapter_duration(book.id, 5), None);
    }
}
