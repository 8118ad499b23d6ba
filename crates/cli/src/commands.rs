// FILE: crates/cli/src/commands.rs

use crate::library::{find_book, load_library, save_library};
use anyhow::{Context, Result};
use console::style;
use earshot_config::{Config, ConfigManager};
use earshot_core::{chapter_display_name, format_time, Book};
use earshot_playback::{
    BookChest, Collaborators, CoreSettings, MemoryBookChest, MemoryBookmarks, NullPlayer,
    PlaybackCore,
};
use std::path::Path;
use std::sync::Arc;

/// List all books in the library
pub fn list_books(library: &Path) -> Result<()> {
    let books = load_library(library)?;

    if books.is_empty() {
        println!("No books in {}.", library.display());
        return Ok(());
    }

    println!("\n{} Books in Library", style(books.len()).bold().cyan());
    println!("{}", "=".repeat(80));

    for book in &books {
        print_book_summary(book);
    }

    Ok(())
}

/// Show chapters and saved position of a book
pub fn show_book_info(library: &Path, query: &str) -> Result<()> {
    let books = load_library(library)?;
    let book = find_book(&books, query)?;

    println!("\n{}", style(&book.name).bold().cyan());
    println!("{}", "=".repeat(80));
    println!("ID: {}", book.id);
    println!("Duration: {}", format_time(book.duration_ms(), book.duration_ms()));
    if let Some(cover) = &book.cover_path {
        println!("Cover: {}", cover.display());
    }

    println!("\nChapters:");
    for (index, chapter) in book.chapters().iter().enumerate() {
        let marker = if index == book.current_chapter_index() {
            style("▶").green().to_string()
        } else {
            " ".to_string()
        };
        println!(
            " {} {:<50} {}",
            marker,
            chapter_display_name(index, &chapter.name),
            format_time(chapter.duration_ms, chapter.duration_ms)
        );
    }

    println!(
        "\nResume at: {}",
        format_time(book.offset_ms(), book.current_chapter().duration_ms)
    );

    Ok(())
}

/// Play a book interactively, then write positions back to the library
pub async fn play_book(library: &Path, query: &str, config: &Config) -> Result<()> {
    let books = load_library(library)?;
    let book = find_book(&books, query)?.clone();

    println!("\n{} {}", style("▶").green().bold(), style(&book.name).bold());

    let chest = Arc::new(MemoryBookChest::with_books(books.iter().cloned()));
    let bookmarks = Arc::new(MemoryBookmarks::new());
    let collaborators = Collaborators::new(chest.clone(), bookmarks.clone(), Arc::new(NullPlayer));

    let core = PlaybackCore::start(CoreSettings::from(&config.player), collaborators);
    let printers = crate::player::spawn_printers(&core.handle(), &book);

    let result = crate::player::run(core.handle(), &book, &bookmarks).await;

    drop(core);
    for printer in printers {
        let _ = printer.await;
    }

    let updated: Vec<Book> = books
        .iter()
        .map(|b| chest.book_by_id(b.id).unwrap_or_else(|| b.clone()))
        .collect();
    save_library(library, &updated).context("Failed to save positions")?;

    result
}

/// Write a default configuration file if none exists
pub fn init_config(manager: &ConfigManager) -> Result<()> {
    if manager.initialize().context("Failed to initialize configuration")? {
        println!(
            "{} Created {}",
            style("✓").green().bold(),
            manager.config_path().display()
        );
    } else {
        println!("Configuration already exists at {}", manager.config_path().display());
    }
    Ok(())
}

/// Print the effective configuration
pub fn show_config(manager: &ConfigManager, config: &Config) -> Result<()> {
    println!("# {}", manager.config_path().display());
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);

    for warning in manager.validate().context("Failed to validate configuration")? {
        println!("{} {}", style("!").yellow().bold(), warning);
    }
    Ok(())
}

fn print_book_summary(book: &Book) {
    println!("\n{}", style(&book.name).bold());
    println!(
        "  ID: {} | Chapters: {} | Duration: {}",
        truncate(&book.id.to_string(), 8),
        book.chapter_count(),
        format_duration(book.duration_ms() / 1000)
    );
    if book.position() != earshot_core::Position::start() {
        println!(
            "  Resume at chapter {}, {}",
            book.current_chapter_index() + 1,
            format_time(book.offset_ms(), book.current_chapter().duration_ms)
        );
    }
}

fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len])
    }
}
