// FILE: crates/playback/src/error.rs

use earshot_core::BookId;
use thiserror::Error;

/// Why a control call was rejected before touching any state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidRequest {
    #[error("chapter {index} is out of range (book has {count} chapters)")]
    ChapterOutOfRange { index: usize, count: usize },

    #[error("offset {0}ms is negative")]
    NegativeOffset(i64),

    #[error("offset {offset_ms}ms is past the end of the chapter ({duration_ms}ms)")]
    OffsetPastEnd { offset_ms: u64, duration_ms: u64 },

    #[error("playback speed {0} is outside 0.5 - 2.0")]
    InvalidSpeed(f32),

    #[error("no book is loaded")]
    NoActiveBook,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] InvalidRequest),

    #[error("Unknown book: {0}")]
    UnknownBook(BookId),

    #[error("Playback core has shut down")]
    CoreStopped,
}

impl PlaybackError {
    /// True for the rejections that mean "that position is not in the book"
    pub fn is_invalid_position(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(
                InvalidRequest::ChapterOutOfRange { .. }
                    | InvalidRequest::NegativeOffset(_)
                    | InvalidRequest::OffsetPastEnd { .. }
            )
        )
    }
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;
