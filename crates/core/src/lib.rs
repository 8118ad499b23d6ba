//! Domain types shared by every Earshot crate
//!
//! Books, chapters, positions, play states and bookmarks, plus the small
//! formatting helpers front-ends use to display them.

pub mod error;
pub mod format;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use format::{chapter_display_name, format_time};
pub use types::{
    Book, BookId, Bookmark, BookmarkId, Chapter, PlayState, PlaybackSpeed, Position, Timestamp,
    Validator,
};
