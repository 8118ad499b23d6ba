//! Playback-related domain models

use crate::error::CoreError;
use crate::types::Validator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether audio is currently being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlayState {
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }

    /// Compact encoding used for lock-free snapshots
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Playing => 0,
            Self::Paused => 1,
            Self::Stopped => 2,
        }
    }

    /// Inverse of [`PlayState::as_u8`]; unknown values decode as `Stopped`
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Playing,
            1 => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for PlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing => write!(f, "playing"),
            Self::Paused => write!(f, "paused"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// A point in a book's timeline: chapter index plus offset into that chapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub chapter_index: usize,
    pub offset_ms: u64,
}

impl Position {
    pub fn new(chapter_index: usize, offset_ms: u64) -> Self {
        Self {
            chapter_index,
            offset_ms,
        }
    }

    /// Start of the first chapter
    pub fn start() -> Self {
        Self::new(0, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chapter {} @ {}ms", self.chapter_index + 1, self.offset_ms)
    }
}

/// Playback speed multiplier (0.5x - 2.0x)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSpeed(f32);

impl PlaybackSpeed {
    pub const MIN: f32 = 0.5;
    pub const MAX: f32 = 2.0;

    /// Creates a playback speed, rejecting values outside 0.5 - 2.0
    pub fn new(speed: f32) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&speed) {
            Ok(Self(speed))
        } else {
            Err(CoreError::InvalidSpeed(speed))
        }
    }

    /// Returns the speed value
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Validator for PlaybackSpeed {
    fn validate(&self) -> Result<(), Vec<String>> {
        if (Self::MIN..=Self::MAX).contains(&self.0) {
            Ok(())
        } else {
            Err(vec!["Speed must be between 0.5 and 2.0".to_string()])
        }
    }
}
