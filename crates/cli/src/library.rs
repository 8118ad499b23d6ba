// FILE: crates/cli/src/library.rs

//! The JSON library file: an array of books

use anyhow::{bail, Context, Result};
use earshot_core::{Book, BookId};
use std::path::Path;

pub fn load_library(path: &Path) -> Result<Vec<Book>> {
    if !path.exists() {
        bail!(
            "Library file not found: {} (set app.library_path or pass --library)",
            path.display()
        );
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let books: Vec<Book> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    log::debug!("Loaded {} books from {}", books.len(), path.display());
    Ok(books)
}

pub fn save_library(path: &Path, books: &[Book]) -> Result<()> {
    let json = serde_json::to_string_pretty(books).context("Failed to serialize library")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Finds a book by id, or by a name fragment matching exactly one book
pub fn find_book<'a>(books: &'a [Book], query: &str) -> Result<&'a Book> {
    if let Ok(id) = BookId::from_string(query) {
        return books
            .iter()
            .find(|b| b.id == id)
            .with_context(|| format!("No book with id {}", id));
    }

    let needle = query.to_lowercase();
    if let Some(exact) = books.iter().find(|b| b.name.to_lowercase() == needle) {
        return Ok(exact);
    }

    let matches: Vec<&Book> = books
        .iter()
        .filter(|b| b.name.to_lowercase().contains(&needle))
        .collect();

    match matches.as_slice() {
        [book] => Ok(book),
        [] => bail!("No book matches '{}'", query),
        _ => bail!("'{}' matches {} books, be more specific", query, matches.len()),
    }
}
