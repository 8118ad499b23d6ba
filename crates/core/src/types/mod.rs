//! Domain types for Earshot
//!
//! - `book`: Book and Chapter types
//! - `playback`: play state, position and speed
//! - `bookmark`: user bookmarks
//! - `common`: shared traits and utilities

mod book;
mod bookmark;
mod common;
mod playback;

pub use book::{Book, BookId, Chapter};
pub use bookmark::{Bookmark, BookmarkId};
pub use common::{Timestamp, Validator};
pub use playback::{PlayState, PlaybackSpeed, Position};
