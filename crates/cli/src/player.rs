// FILE: crates/cli/src/player.rs

//! Line-driven player on top of a playback handle

use anyhow::Result;
use console::style;
use earshot_core::{chapter_display_name, format_time, Book, Chapter, Position};
use earshot_playback::{BookmarkProvider, MemoryBookmarks, PlaybackHandle, PlaybackResult};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

const HELP: &str = "\
Commands:
  play | pause | stop | toggle
  seek <chapter> <time>     jump to a time, e.g. `seek 2 1:30`
  chapter <n>               start of chapter n
  next | prev               neighbouring chapter
  rew | ff                  skip back / forward
  speed <0.5-2.0>
  sleep                     start or cancel the sleep timer
  bookmark [title]          bookmark the current position
  bookmarks                 list bookmarks of this book
  progress <time>           report engine progress in the current chapter
  status | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Play,
    Pause,
    Stop,
    Toggle,
    Seek { chapter_index: usize, offset_ms: i64 },
    Chapter(usize),
    Next,
    Previous,
    Rewind,
    FastForward,
    Speed(f32),
    Sleep,
    Bookmark(Option<String>),
    Bookmarks,
    Progress(u64),
    Status,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<PlayerCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb.to_lowercase().as_str(), args.as_slice()) {
        ("play", []) => PlayerCommand::Play,
        ("pause", []) => PlayerCommand::Pause,
        ("stop", []) => PlayerCommand::Stop,
        ("toggle" | "p", []) => PlayerCommand::Toggle,
        ("seek", [chapter, time]) => PlayerCommand::Seek {
            chapter_index: parse_chapter(chapter)?,
            offset_ms: parse_offset(time)?,
        },
        ("chapter", [chapter]) => PlayerCommand::Chapter(parse_chapter(chapter)?),
        ("next" | "n", []) => PlayerCommand::Next,
        ("prev" | "previous", []) => PlayerCommand::Previous,
        ("rew" | "rewind", []) => PlayerCommand::Rewind,
        ("ff" | "forward", []) => PlayerCommand::FastForward,
        ("speed", [value]) => PlayerCommand::Speed(
            value
                .parse()
                .map_err(|_| format!("'{}' is not a speed", value))?,
        ),
        ("sleep", []) => PlayerCommand::Sleep,
        ("bookmark" | "b", []) => PlayerCommand::Bookmark(None),
        ("bookmark" | "b", title) => PlayerCommand::Bookmark(Some(title.join(" "))),
        ("bookmarks", []) => PlayerCommand::Bookmarks,
        ("progress", [time]) => {
            let offset = parse_offset(time)?;
            PlayerCommand::Progress(
                u64::try_from(offset).map_err(|_| format!("'{}' is negative", time))?,
            )
        }
        ("status" | "s", []) => PlayerCommand::Status,
        ("help" | "?", []) => PlayerCommand::Help,
        ("quit" | "q" | "exit", []) => PlayerCommand::Quit,
        (other, _) => return Err(format!("unknown command or arguments: {}", other)),
    };

    Ok(command)
}

/// 1-based chapter number to index
fn parse_chapter(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("chapters are numbered from 1".to_string()),
        Ok(number) => Ok(number - 1),
        Err(_) => Err(format!("'{}' is not a chapter number", value)),
    }
}

/// `[[h:]m:]s` to milliseconds; a leading `-` is kept
pub fn parse_offset(value: &str) -> Result<i64, String> {
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    let parts: Vec<&str> = digits.split(':').collect();
    if parts.len() > 3 {
        return Err(format!("'{}' is not a time", value));
    }

    let not_a_time = || format!("'{}' is not a time", value);
    let mut seconds: i64 = 0;
    for part in parts {
        let n: i64 = part.parse().map_err(|_| not_a_time())?;
        seconds = seconds
            .checked_mul(60)
            .and_then(|s| s.checked_add(n))
            .ok_or_else(not_a_time)?;
    }

    let ms = seconds.checked_mul(1000).ok_or_else(not_a_time)?;
    Ok(if negative { -ms } else { ms })
}

fn describe(chapters: &[Chapter], position: Position) -> String {
    match chapters.get(position.chapter_index) {
        Some(chapter) => format!(
            "{}  {} / {}",
            chapter_display_name(position.chapter_index, &chapter.name),
            format_time(position.offset_ms, chapter.duration_ms),
            format_time(chapter.duration_ms, chapter.duration_ms),
        ),
        None => position.to_string(),
    }
}

/// Prints play state, position and sleep timer changes until the core is gone
pub fn spawn_printers(handle: &PlaybackHandle, book: &Book) -> Vec<JoinHandle<()>> {
    let states = handle.subscribe_play_state();
    let positions = handle.subscribe_positions(Some(book.id));
    let sleep = handle.subscribe_sleep_timer();
    let chapters = book.chapters().to_vec();

    vec![
        tokio::task::spawn_blocking(move || {
            for state in states {
                println!("{} {}", style("●").cyan(), state);
            }
        }),
        tokio::task::spawn_blocking(move || {
            for change in positions {
                println!("{} {}", style("⏵").green(), describe(&chapters, change.position));
            }
        }),
        tokio::task::spawn_blocking(move || {
            let mut was_active = false;
            for remaining_ms in sleep {
                if remaining_ms == 0 {
                    if was_active {
                        println!("{} Sleep timer off", style("☾").yellow());
                    }
                    was_active = false;
                } else {
                    if !was_active || remaining_ms % 60_000 == 0 {
                        println!(
                            "{} Sleep timer: {} left",
                            style("☾").yellow(),
                            format_time(remaining_ms, remaining_ms)
                        );
                    }
                    was_active = true;
                }
            }
        }),
    ]
}

/// Reads commands from stdin until `quit` or end of input
pub async fn run(handle: PlaybackHandle, book: &Book, bookmarks: &MemoryBookmarks) -> Result<()> {
    handle.load_book(book.id)?;
    println!("{}", style("Type `help` for commands.").dim());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{} {}", style("?").red(), message);
                continue;
            }
        };

        if command == PlayerCommand::Quit {
            break;
        }

        if let Err(e) = execute(&handle, book, bookmarks, command) {
            println!("{} {}", style("✗").red().bold(), e);
        }
    }

    handle.stop()?;
    handle.flush()?;
    Ok(())
}

fn execute(
    handle: &PlaybackHandle,
    book: &Book,
    bookmarks: &MemoryBookmarks,
    command: PlayerCommand,
) -> PlaybackResult<()> {
    match command {
        PlayerCommand::Play => handle.play(),
        PlayerCommand::Pause => handle.pause(),
        PlayerCommand::Stop => handle.stop(),
        PlayerCommand::Toggle => handle.play_pause(),
        PlayerCommand::Seek {
            chapter_index,
            offset_ms,
        } => handle.seek(chapter_index, offset_ms),
        PlayerCommand::Chapter(index) => handle.seek_to_chapter(index),
        PlayerCommand::Next => handle.next(),
        PlayerCommand::Previous => handle.previous(),
        PlayerCommand::Rewind => handle.rewind(),
        PlayerCommand::FastForward => handle.fast_forward(),
        PlayerCommand::Speed(speed) => handle.set_speed(speed),
        PlayerCommand::Sleep => handle.toggle_sleep_timer(),
        PlayerCommand::Bookmark(title) => {
            let title = match title {
                Some(title) => title,
                None => handle
                    .current_position(book.id)
                    .map(|p| describe(book.chapters(), p))
                    .unwrap_or_else(|| "Bookmark".to_string()),
            };
            handle.add_bookmark(title)?;
            handle.flush()
        }
        PlayerCommand::Bookmarks => {
            let list = bookmarks.bookmarks_for(book.id);
            if list.is_empty() {
                println!("No bookmarks yet.");
            }
            for bookmark in list {
                println!(
                    "  {}  {}",
                    style(&bookmark.title).bold(),
                    describe(book.chapters(), bookmark.position)
                );
            }
            Ok(())
        }
        PlayerCommand::Progress(offset_ms) => handle.report_progress(offset_ms),
        PlayerCommand::Status => {
            print_status(handle, book);
            Ok(())
        }
        PlayerCommand::Help => {
            println!("{}", HELP);
            Ok(())
        }
        PlayerCommand::Quit => Ok(()),
    }
}

fn print_status(handle: &PlaybackHandle, book: &Book) {
    println!("{}", style(&book.name).bold());
    println!("  State:    {}", handle.play_state());
    if let Some(position) = handle.current_position(book.id) {
        println!("  Position: {}", describe(book.chapters(), position));
    }
    println!("  Speed:    {:.2}x", handle.speed().value());
    if handle.sleep_timer_active() {
        let remaining = handle.sleep_timer_remaining().as_millis() as u64;
        println!("  Sleep:    {} left", format_time(remaining, remaining));
    } else {
        println!("  Sleep:    off");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("play"), Ok(PlayerCommand::Play));
        assert_eq!(parse_command("  NEXT "), Ok(PlayerCommand::Next));
        assert_eq!(parse_command("q"), Ok(PlayerCommand::Quit));
        assert_eq!(parse_command("sleep"), Ok(PlayerCommand::Sleep));
    }

    #[test]
    fn test_parse_seek_uses_one_based_chapters() {
        assert_eq!(
            parse_command("seek 2 1:30"),
            Ok(PlayerCommand::Seek {
                chapter_index: 1,
                offset_ms: 90_000
            })
        );
        assert_eq!(parse_command("chapter 1"), Ok(PlayerCommand::Chapter(0)));
        assert!(parse_command("chapter 0").is_err());
    }

    #[test]
    fn test_parse_negative_offset_reaches_core() {
        assert_eq!(
            parse_command("seek 1 -5"),
            Ok(PlayerCommand::Seek {
                chapter_index: 0,
                offset_ms: -5_000
            })
        );
        assert!(parse_command("progress -5").is_err());
    }

    #[test]
    fn test_parse_bookmark_title() {
        assert_eq!(parse_command("bookmark"), Ok(PlayerCommand::Bookmark(None)));
        assert_eq!(
            parse_command("bookmark the big reveal"),
            Ok(PlayerCommand::Bookmark(Some("the big reveal".to_string())))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("").is_err());
        assert!(parse_command("speed fast").is_err());
        assert!(parse_command("dance").is_err());
        assert!(parse_command("play now").is_err());
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("45"), Ok(45_000));
        assert_eq!(parse_offset("2:05"), Ok(125_000));
        assert_eq!(parse_offset("1:00:00"), Ok(3_600_000));
        assert!(parse_offset("1:2:3:4").is_err());
        assert!(parse_offset("x").is_err());
    }

    #[test]
    fn test_describe_position() {
        let chapters = vec![Chapter::new("01 Arrival", "/a/1.mp3", 125_000)];
        assert_eq!(
            describe(&chapters, Position::new(0, 65_000)),
            "1 - Arrival  01:05 / 02:05"
        );
    }
}
