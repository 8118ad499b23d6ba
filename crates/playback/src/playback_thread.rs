// FILE: crates/playback/src/playback_thread.rs

//! The owner thread
//!
//! Every mutation of the core happens here, one command at a time. Handles
//! validate against snapshots before enqueueing; the owner validates again
//! because the world may have moved on in between, and drops (with a
//! warning) whatever no longer applies.

use crate::engine::{Collaborators, Shared};
use crate::error::{PlaybackError, PlaybackResult};
use crate::settings::CoreSettings;
use crate::sleep_timer::{SleepTimer, SleepTimerState, TickOutcome, Toggle};
use crossbeam_channel::{at, never, select, Receiver, Sender};
use earshot_core::{Book, BookId, PlayState, PlaybackSpeed, Position};
use std::sync::Arc;
use std::time::Instant;

/// Commands sent to the owner thread
#[derive(Debug)]
pub(crate) enum Command {
    /// Read from the chest here, after everything queued before it
    Load {
        book_id: BookId,
        reply: Sender<PlaybackResult<()>>,
    },
    Play,
    Pause,
    Stop,
    PlayPause,
    Seek {
        book_id: BookId,
        chapter_index: usize,
        offset_ms: i64,
    },
    Next,
    Previous,
    Rewind,
    FastForward,
    Progress {
        book_id: BookId,
        chapter_index: usize,
        offset_ms: u64,
    },
    SetSpeed(PlaybackSpeed),
    ToggleSleepTimer,
    AddBookmark(String),
    Flush(Sender<()>),
    Shutdown,
}

pub(crate) struct Owner {
    settings: CoreSettings,
    shared: Arc<Shared>,
    collaborators: Collaborators,
    book: Option<Book>,
    timer: SleepTimer,
    /// Generation and due time of the next sleep timer tick
    next_tick: Option<(u64, Instant)>,
}

impl Owner {
    pub(crate) fn new(
        settings: CoreSettings,
        shared: Arc<Shared>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            settings,
            shared,
            collaborators,
            book: None,
            timer: SleepTimer::new(),
            next_tick: None,
        }
    }

    pub(crate) fn run(mut self, commands: Receiver<Command>) {
        log::info!("Playback core started");
        self.apply_speed(self.settings.default_speed);

        loop {
            let tick = match self.next_tick {
                Some((_, due)) => at(due),
                None => never(),
            };

            select! {
                recv(commands) -> command => match command {
                    Ok(Command::Shutdown) | Err(_) => break,
                    Ok(command) => self.apply(command),
                },
                recv(tick) -> _ => self.on_tick(),
            }
        }

        self.stop();
        log::info!("Playback core stopped");
    }

    fn apply(&mut self, command: Command) {
        log::debug!("Applying {:?}", command);

        match command {
            Command::Load { book_id, reply } => {
                let _ = reply.send(self.load(book_id));
            }
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::Stop => self.stop(),
            Command::PlayPause => {
                if self.shared.play_state.current().is_playing() {
                    self.pause();
                } else {
                    self.play();
                }
            }
            Command::Seek {
                book_id,
                chapter_index,
                offset_ms,
            } => self.seek(book_id, chapter_index, offset_ms),
            Command::Next => self.step_chapter(1),
            Command::Previous => self.step_chapter(-1),
            Command::Rewind => self.skip(false),
            Command::FastForward => self.skip(true),
            Command::Progress {
                book_id,
                chapter_index,
                offset_ms,
            } => self.progress(book_id, chapter_index, offset_ms),
            Command::SetSpeed(speed) => self.apply_speed(speed),
            Command::ToggleSleepTimer => self.toggle_sleep_timer(),
            Command::AddBookmark(title) => self.add_bookmark(&title),
            Command::Flush(done) => {
                let _ = done.send(());
            }
            Command::Shutdown => {}
        }
    }

    fn load(&mut self, book_id: BookId) -> PlaybackResult<()> {
        let book = self
            .collaborators
            .chest
            .book_by_id(book_id)
            .ok_or(PlaybackError::UnknownBook(book_id))?;

        if self.book.is_some() {
            self.stop();
        }

        let position = book.position();
        log::info!("Loaded '{}' at {}", book.name, position);

        self.shared.positions.track(&book);
        self.shared.set_current_book(Some(book.id));
        self.collaborators
            .player
            .seek(book.current_chapter(), position.offset_ms);
        self.book = Some(book);
        Ok(())
    }

    fn play(&mut self) {
        let Some(book) = &self.book else {
            log::warn!("Ignoring play: no book is loaded");
            return;
        };
        if self.shared.play_state.current().is_playing() {
            return;
        }

        self.collaborators
            .player
            .play(book.current_chapter(), book.offset_ms());
        self.shared.play_state.set(PlayState::Playing);
    }

    fn pause(&mut self) {
        if self.shared.play_state.current() != PlayState::Playing {
            return;
        }
        self.collaborators.player.pause();
        self.shared.play_state.set(PlayState::Paused);
    }

    fn stop(&mut self) {
        if self.shared.play_state.current() == PlayState::Stopped {
            return;
        }
        self.collaborators.player.stop();
        self.shared.play_state.set(PlayState::Stopped);
    }

    fn seek(&mut self, book_id: BookId, chapter_index: usize, offset_ms: i64) {
        let position = match self
            .shared
            .positions
            .set_position(book_id, chapter_index, offset_ms)
        {
            Ok(position) => position,
            Err(e) => {
                log::warn!("Dropping seek for {}: {}", book_id, e);
                return;
            }
        };

        self.collaborators.chest.update_position(book_id, position);

        if let Some(book) = self.book.as_mut().filter(|b| b.id == book_id) {
            if let Err(e) = book.set_position(position) {
                log::warn!("Current book rejected {}: {}", position, e);
                return;
            }
            self.collaborators
                .player
                .seek(book.current_chapter(), position.offset_ms);
        }
    }

    fn step_chapter(&mut self, delta: isize) {
        let Some(book) = &self.book else {
            log::warn!("Ignoring chapter change: no book is loaded");
            return;
        };

        let current = book.current_chapter_index();
        let Some(target) = current
            .checked_add_signed(delta)
            .filter(|&index| index < book.chapter_count())
        else {
            log::debug!("Already at chapter boundary {}", current + 1);
            return;
        };

        let book_id = book.id;
        self.seek(book_id, target, 0);
    }

    fn skip(&mut self, forward: bool) {
        let Some(book) = &self.book else {
            log::warn!("Ignoring skip: no book is loaded");
            return;
        };

        let step = u64::try_from(self.settings.seek_time.as_millis()).unwrap_or(u64::MAX);
        let duration = book.current_chapter().duration_ms;
        let offset = if forward {
            book.offset_ms().saturating_add(step).min(duration)
        } else {
            book.offset_ms().saturating_sub(step)
        };

        let (book_id, chapter_index) = (book.id, book.current_chapter_index());
        self.seek(
            book_id,
            chapter_index,
            i64::try_from(offset).unwrap_or(i64::MAX),
        );
    }

    fn progress(&mut self, book_id: BookId, chapter_index: usize, offset_ms: u64) {
        let Some(book) = self.book.as_mut().filter(|b| b.id == book_id) else {
            log::warn!("Dropping progress for {}: not the current book", book_id);
            return;
        };
        if book.current_chapter_index() != chapter_index {
            log::debug!("Dropping progress for chapter {}", chapter_index + 1);
            return;
        }

        let position = Position::new(chapter_index, offset_ms);
        if let Err(e) = book.set_position(position) {
            log::warn!("Dropping progress {}: {}", position, e);
            return;
        }
        match self
            .shared
            .positions
            .set_position(
                book_id,
                chapter_index,
                i64::try_from(offset_ms).unwrap_or(i64::MAX),
            )
        {
            Ok(position) => self.collaborators.chest.update_position(book_id, position),
            Err(e) => log::warn!("Dropping progress for {}: {}", book_id, e),
        }
    }

    fn apply_speed(&mut self, speed: PlaybackSpeed) {
        self.shared.set_speed(speed);
        self.collaborators.player.set_speed(speed);
    }

    fn toggle_sleep_timer(&mut self) {
        match self.timer.toggle(self.settings.sleep_duration) {
            Toggle::Started {
                remaining_ms,
                generation,
            } => {
                log::info!("Sleep timer started: {}ms", remaining_ms);
                self.shared
                    .sleep
                    .publish(SleepTimerState::Active { remaining_ms });
                self.next_tick = Some((generation, Instant::now() + self.settings.sleep_tick));

                if self.settings.bookmark_on_sleep_timer {
                    let title = format!(
                        "{}: Sleep timer",
                        chrono::Local::now().format("%Y-%m-%d %H:%M")
                    );
                    self.add_bookmark(&title);
                }
            }
            Toggle::Cancelled => {
                log::info!("Sleep timer cancelled");
                self.next_tick = None;
                self.shared.sleep.publish(SleepTimerState::Inactive);
            }
        }
    }

    fn on_tick(&mut self) {
        let Some((generation, due)) = self.next_tick.take() else {
            return;
        };

        match self.timer.tick(generation, self.settings.sleep_tick) {
            TickOutcome::Stale => log::debug!("Discarding stale sleep timer tick"),
            TickOutcome::Running { remaining_ms } => {
                self.shared
                    .sleep
                    .publish(SleepTimerState::Active { remaining_ms });
                self.next_tick = Some((generation, due + self.settings.sleep_tick));
            }
            TickOutcome::Fired => {
                log::info!("Sleep timer expired, stopping playback");
                self.shared.sleep.publish(SleepTimerState::Inactive);
                self.stop();
            }
        }
    }

    fn add_bookmark(&self, title: &str) {
        let Some(book) = &self.book else {
            log::warn!("Ignoring bookmark '{}': no book is loaded", title);
            return;
        };

        let bookmark =
            self.collaborators
                .bookmarks
                .add_bookmark_at_position(book.id, book.position(), title);
        log::info!("Added bookmark '{}' at {}", bookmark.title, bookmark.position);
    }
}
