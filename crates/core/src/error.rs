//! Error types for malformed domain data

use thiserror::Error;

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised when domain values break their invariants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A book was built without any chapters
    #[error("Book '{name}' has no chapters")]
    EmptyBook { name: String },

    /// A position does not point inside the book's timeline
    #[error("Invalid position: chapter {chapter_index} offset {offset_ms}ms ({reason})")]
    InvalidPosition {
        chapter_index: usize,
        offset_ms: u64,
        reason: String,
    },

    /// Playback speed outside the supported range
    #[error("Invalid playback speed: {0}")]
    InvalidSpeed(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_book_display() {
        let err = CoreError::EmptyBook {
            name: "Dune".to_string(),
        };
        assert_eq!(err.to_string(), "Book 'Dune' has no chapters");
    }

    #[test]
    fn test_invalid_position_display() {
        let err = CoreError::InvalidPosition {
            chapter_index: 2,
            offset_ms: 5000,
            reason: "chapter out of range".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("chapter 2"));
        assert!(msg.contains("5000ms"));
    }

    #[test]
    fn test_invalid_speed_display() {
        let err = CoreError::InvalidSpeed(2.5);
        assert_eq!(err.to_string(), "Invalid playback speed: 2.5");
        assert_eq!(err.clone(), CoreError::InvalidSpeed(2.5));
        assert_ne!(err, CoreError::InvalidSpeed(0.25));
    }
}
