//! Book and chapter domain models

use crate::error::{CoreError, Result};
use crate::types::{Position, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    /// Creates a new random BookId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a BookId from a UUID string
    pub fn from_string(s: &str) -> std::result::Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Returns the BookId as a string
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One playable segment of a book
///
/// Chapters are immutable once created. Their index is their position in
/// the owning book's chapter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub name: String,
    pub file: PathBuf,
    pub duration_ms: u64,
}

impl Chapter {
    /// Creates a new chapter
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            duration_ms,
        }
    }
}

/// An audiobook: metadata, ordered chapters and the last played position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BookData")]
pub struct Book {
    pub id: BookId,
    pub name: String,
    chapters: Vec<Chapter>,
    current_chapter: usize,
    offset_ms: u64,
    pub cover_path: Option<PathBuf>,
    pub use_cover_replacement: bool,
}

impl Book {
    /// Creates a book positioned at the start of its first chapter
    pub fn new(name: impl Into<String>, chapters: Vec<Chapter>) -> Result<Self> {
        let name = name.into();
        if chapters.is_empty() {
            return Err(CoreError::EmptyBook { name });
        }

        Ok(Self {
            id: BookId::new(),
            name,
            chapters,
            current_chapter: 0,
            offset_ms: 0,
            cover_path: None,
            use_cover_replacement: true,
        })
    }

    /// Uses a fixed id instead of a random one
    pub fn with_id(mut self, id: BookId) -> Self {
        self.id = id;
        self
    }

    /// Attaches cover art and turns the generated replacement cover off
    pub fn with_cover(mut self, cover_path: impl Into<PathBuf>) -> Self {
        self.cover_path = Some(cover_path.into());
        self.use_cover_replacement = false;
        self
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Returns the chapter the book is currently positioned in
    pub fn current_chapter(&self) -> &Chapter {
        // current_chapter is kept in range by every mutator
        &self.chapters[self.current_chapter]
    }

    pub fn current_chapter_index(&self) -> usize {
        self.current_chapter
    }

    pub fn offset_ms(&self) -> u64 {
        self.offset_ms
    }

    /// Returns the last played position
    pub fn position(&self) -> Position {
        Position::new(self.current_chapter, self.offset_ms)
    }

    /// Total duration of all chapters in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.chapters.iter().map(|c| c.duration_ms).sum()
    }

    /// Checks that a position lies inside this book's timeline
    pub fn check_position(&self, position: Position) -> Result<()> {
        let chapter = self
            .chapters
            .get(position.chapter_index)
            .ok_or_else(|| CoreError::InvalidPosition {
                chapter_index: position.chapter_index,
                offset_ms: position.offset_ms,
                reason: format!("book has {} chapters", self.chapters.len()),
            })?;

        if position.offset_ms > chapter.duration_ms {
            return Err(CoreError::InvalidPosition {
                chapter_index: position.chapter_index,
                offset_ms: position.offset_ms,
                reason: format!("chapter lasts {}ms", chapter.duration_ms),
            });
        }

        Ok(())
    }

    /// Moves the last played position, rejecting positions outside the book
    pub fn set_position(&mut self, position: Position) -> Result<()> {
        self.check_position(position)?;
        self.current_chapter = position.chapter_index;
        self.offset_ms = position.offset_ms;
        Ok(())
    }
}

/// Unchecked wire form of [`Book`]; deserialization goes through it so a
/// stored book can never break the chapter invariants.
#[derive(Deserialize)]
struct BookData {
    #[serde(default)]
    id: BookId,
    name: String,
    chapters: Vec<Chapter>,
    #[serde(default)]
    current_chapter: usize,
    #[serde(default)]
    offset_ms: u64,
    #[serde(default)]
    cover_path: Option<PathBuf>,
    #[serde(default = "default_use_cover_replacement")]
    use_cover_replacement: bool,
}

fn default_use_cover_replacement() -> bool {
    true
}

impl TryFrom<BookData> for Book {
    type Error = CoreError;

    fn try_from(data: BookData) -> Result<Self> {
        let mut book = Book::new(data.name, data.chapters)?.with_id(data.id);
        book.set_position(Position::new(data.current_chapter, data.offset_ms))?;
        book.cover_path = data.cover_path;
        book.use_cover_replacement = data.use_cover_replacement;
        Ok(book)
    }
}

impl Validator for Book {
    fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Name cannot be empty".to_string());
        }

        if self.chapters.is_empty() {
            errors.push("Book must have at least one chapter".to_string());
        } else if let Err(e) = self.check_position(self.position()) {
            errors.push(e.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
