//! Playback control facade
//!
//! A [`PlaybackCore`] owns the owner thread; [`PlaybackHandle`] clones are
//! how front-ends drive it and read from it. Control calls check the request
//! against the current snapshots, enqueue it and return without waiting.
//! Use [`PlaybackHandle::flush`] to wait until everything issued so far has
//! been applied.

use crate::bookmarks::{BookmarkProvider, MemoryBookmarks};
use crate::chest::{BookChest, MemoryBookChest};
use crate::error::{InvalidRequest, PlaybackError, PlaybackResult};
use crate::observer::Subscription;
use crate::player::{NullPlayer, Player};
use crate::playback_thread::{Command, Owner};
use crate::position::{PositionChange, PositionTracker};
use crate::settings::CoreSettings;
use crate::sleep_timer::SleepCountdown;
use crate::state::PlayStateStore;
use crossbeam_channel::{bounded, unbounded, Sender};
use earshot_core::{BookId, PlayState, PlaybackSpeed, Position};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::Duration;

/// The services the core calls out to
#[derive(Clone)]
pub struct Collaborators {
    pub chest: Arc<dyn BookChest>,
    pub bookmarks: Arc<dyn BookmarkProvider>,
    pub player: Arc<dyn Player>,
}

impl Collaborators {
    pub fn new(
        chest: Arc<dyn BookChest>,
        bookmarks: Arc<dyn BookmarkProvider>,
        player: Arc<dyn Player>,
    ) -> Self {
        Self {
            chest,
            bookmarks,
            player,
        }
    }

    /// Empty in-memory stores and a silent player
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryBookChest::new()),
            Arc::new(MemoryBookmarks::new()),
            Arc::new(NullPlayer),
        )
    }
}

/// State readable from any thread, written by the owner only
pub(crate) struct Shared {
    pub(crate) play_state: PlayStateStore,
    pub(crate) positions: PositionTracker,
    pub(crate) sleep: SleepCountdown,
    speed: AtomicU32,
    current_book: RwLock<Option<BookId>>,
}

impl Shared {
    fn new(speed: PlaybackSpeed) -> Self {
        Self {
            play_state: PlayStateStore::new(),
            positions: PositionTracker::new(),
            sleep: SleepCountdown::new(),
            speed: AtomicU32::new(speed.value().to_bits()),
            current_book: RwLock::new(None),
        }
    }

    pub(crate) fn set_speed(&self, speed: PlaybackSpeed) {
        self.speed.store(speed.value().to_bits(), Ordering::Release);
    }

    fn speed(&self) -> PlaybackSpeed {
        PlaybackSpeed::new(f32::from_bits(self.speed.load(Ordering::Acquire))).unwrap_or_default()
    }

    pub(crate) fn set_current_book(&self, book_id: Option<BookId>) {
        *self
            .current_book
            .write()
            .unwrap_or_else(PoisonError::into_inner) = book_id;
    }

    fn current_book(&self) -> Option<BookId> {
        *self
            .current_book
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A running playback core
///
/// Dropping it shuts the owner thread down; handles still around afterwards
/// report [`PlaybackError::CoreStopped`] for control calls.
pub struct PlaybackCore {
    handle: PlaybackHandle,
    thread: Option<thread::JoinHandle<()>>,
}

impl PlaybackCore {
    pub fn start(settings: CoreSettings, collaborators: Collaborators) -> Self {
        let shared = Arc::new(Shared::new(settings.default_speed));
        let (commands, receiver) = unbounded();

        let handle = PlaybackHandle {
            commands,
            shared: Arc::clone(&shared),
        };

        let owner = Owner::new(settings, shared, collaborators);
        let thread = thread::Builder::new()
            .name("earshot-playback".into())
            .spawn(move || owner.run(receiver));

        let thread = match thread {
            Ok(thread) => Some(thread),
            Err(e) => {
                log::error!("Failed to start playback thread: {}", e);
                None
            }
        };

        Self { handle, thread }
    }

    pub fn handle(&self) -> PlaybackHandle {
        self.handle.clone()
    }

    /// Stops the owner thread and waits for it to finish
    pub fn shutdown(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.handle.commands.send(Command::Shutdown);
            if thread.join().is_err() {
                log::error!("Playback thread panicked");
            }
        }
    }
}

impl Drop for PlaybackCore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Cloneable entry point for controlling and observing playback
#[derive(Clone)]
pub struct PlaybackHandle {
    commands: Sender<Command>,
    shared: Arc<Shared>,
}

impl PlaybackHandle {
    // Control

    /// Makes `book_id` the current book at its persisted position
    ///
    /// Unlike the other control calls this waits until the book is loaded,
    /// so calls issued afterwards are checked against it. The book is read
    /// from the chest only after every earlier call has been applied.
    pub fn load_book(&self, book_id: BookId) -> PlaybackResult<()> {
        let (reply, loaded) = bounded(1);
        self.send(Command::Load { book_id, reply })?;
        loaded.recv().map_err(|_| PlaybackError::CoreStopped)?
    }

    pub fn play(&self) -> PlaybackResult<()> {
        self.active_book()?;
        self.send(Command::Play)
    }

    pub fn pause(&self) -> PlaybackResult<()> {
        self.send(Command::Pause)
    }

    /// Stops playback; the position is kept
    pub fn stop(&self) -> PlaybackResult<()> {
        self.send(Command::Stop)
    }

    pub fn play_pause(&self) -> PlaybackResult<()> {
        if !self.play_state().is_playing() {
            self.active_book()?;
        }
        self.send(Command::PlayPause)
    }

    /// Seeks within the current book
    pub fn seek(&self, chapter_index: usize, offset_ms: i64) -> PlaybackResult<()> {
        let book_id = self.active_book()?;
        self.set_position(book_id, chapter_index, offset_ms)
    }

    pub fn seek_to_chapter(&self, chapter_index: usize) -> PlaybackResult<()> {
        self.seek(chapter_index, 0)
    }

    /// Moves any tracked book to `(chapter_index, offset_ms)`
    pub fn set_position(
        &self,
        book_id: BookId,
        chapter_index: usize,
        offset_ms: i64,
    ) -> PlaybackResult<()> {
        self.shared
            .positions
            .validate(book_id, chapter_index, offset_ms)?;
        self.send(Command::Seek {
            book_id,
            chapter_index,
            offset_ms,
        })
    }

    /// Start of the next chapter; nothing happens in the last one
    pub fn next(&self) -> PlaybackResult<()> {
        self.active_book()?;
        self.send(Command::Next)
    }

    /// Start of the previous chapter; nothing happens in the first one
    pub fn previous(&self) -> PlaybackResult<()> {
        self.active_book()?;
        self.send(Command::Previous)
    }

    pub fn rewind(&self) -> PlaybackResult<()> {
        self.active_book()?;
        self.send(Command::Rewind)
    }

    pub fn fast_forward(&self) -> PlaybackResult<()> {
        self.active_book()?;
        self.send(Command::FastForward)
    }

    pub fn set_speed(&self, speed: f32) -> PlaybackResult<()> {
        let speed = PlaybackSpeed::new(speed).map_err(|_| InvalidRequest::InvalidSpeed(speed))?;
        self.send(Command::SetSpeed(speed))
    }

    pub fn toggle_sleep_timer(&self) -> PlaybackResult<()> {
        self.send(Command::ToggleSleepTimer)
    }

    /// Bookmarks the current position of the current book
    pub fn add_bookmark(&self, title: impl Into<String>) -> PlaybackResult<()> {
        self.active_book()?;
        self.send(Command::AddBookmark(title.into()))
    }

    /// Live progress of the audio engine inside the current chapter
    pub fn report_progress(&self, offset_ms: u64) -> PlaybackResult<()> {
        let book_id = self.active_book()?;
        let chapter_index = self
            .shared
            .positions
            .current_position(book_id)
            .ok_or(PlaybackError::UnknownBook(book_id))?
            .chapter_index;
        let offset = i64::try_from(offset_ms).unwrap_or(i64::MAX);
        self.shared
            .positions
            .validate(book_id, chapter_index, offset)?;

        self.send(Command::Progress {
            book_id,
            chapter_index,
            offset_ms,
        })
    }

    /// Blocks until every call issued before it has been applied
    pub fn flush(&self) -> PlaybackResult<()> {
        let (done, applied) = bounded(1);
        self.send(Command::Flush(done))?;
        applied.recv().map_err(|_| PlaybackError::CoreStopped)
    }

    // Queries

    pub fn play_state(&self) -> PlayState {
        self.shared.play_state.current()
    }

    pub fn current_position(&self, book_id: BookId) -> Option<Position> {
        self.shared.positions.current_position(book_id)
    }

    pub fn current_book(&self) -> Option<BookId> {
        self.shared.current_book()
    }

    pub fn sleep_timer_remaining(&self) -> Duration {
        Duration::from_millis(self.shared.sleep.remaining_ms())
    }

    pub fn sleep_timer_active(&self) -> bool {
        self.shared.sleep.is_active()
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.shared.speed()
    }

    // Subscriptions

    pub fn subscribe_play_state(&self) -> Subscription<PlayState> {
        self.shared.play_state.subscribe()
    }

    /// Position changes of one book, or of every book with `None`
    pub fn subscribe_positions(&self, book_id: Option<BookId>) -> Subscription<PositionChange> {
        self.shared.positions.subscribe(book_id)
    }

    /// Remaining sleep timer milliseconds; `0` when it goes inactive
    pub fn subscribe_sleep_timer(&self) -> Subscription<u64> {
        self.shared.sleep.subscribe()
    }

    fn active_book(&self) -> PlaybackResult<BookId> {
        self.current_book()
            .ok_or(PlaybackError::InvalidRequest(InvalidRequest::NoActiveBook))
    }

    fn send(&self, command: Command) -> PlaybackResult<()> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::CoreStopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earshot_core::{Book, Chapter};

    fn started() -> (PlaybackCore, BookId) {
        let book = Book::new(
            "B",
            vec![
                Chapter::new("1", "/b/1.mp3", 60_000),
                Chapter::new("2", "/b/2.mp3", 120_000),
                Chapter::new("3", "/b/3.mp3", 30_000),
            ],
        )
        .unwrap();
        let id = book.id;
        let collaborators = Collaborators::new(
            Arc::new(MemoryBookChest::with_books([book])),
            Arc::new(MemoryBookmarks::new()),
            Arc::new(NullPlayer),
        );
        (PlaybackCore::start(CoreSettings::default(), collaborators), id)
    }

    #[test]
    fn test_calls_without_book() {
        let core = PlaybackCore::start(CoreSettings::default(), Collaborators::in_memory());
        let handle = core.handle();

        let no_book = PlaybackError::InvalidRequest(InvalidRequest::NoActiveBook);
        assert_eq!(handle.play(), Err(no_book.clone()));
        assert_eq!(handle.seek(0, 0), Err(no_book.clone()));
        assert_eq!(handle.next(), Err(no_book));
        assert!(handle.pause().is_ok());
        assert!(handle.stop().is_ok());
        assert_eq!(handle.current_book(), None);
    }

    #[test]
    fn test_load_book_is_applied_on_return() {
        let (core, id) = started();
        let handle = core.handle();

        handle.load_book(id).unwrap();
        assert_eq!(handle.current_book(), Some(id));
        assert_eq!(handle.current_position(id), Some(Position::start()));
    }

    #[test]
    fn test_unknown_book() {
        let (core, _) = started();
        let missing = BookId::new();
        assert_eq!(
            core.handle().load_book(missing),
            Err(PlaybackError::UnknownBook(missing))
        );
    }

    #[test]
    fn test_speed_round_trip() {
        let (core, _) = started();
        let handle = core.handle();

        assert_eq!(handle.speed().value(), 1.0);
        handle.set_speed(1.5).unwrap();
        handle.flush().unwrap();
        assert_eq!(handle.speed().value(), 1.5);

        assert_eq!(
            handle.set_speed(2.5),
            Err(PlaybackError::InvalidRequest(InvalidRequest::InvalidSpeed(2.5)))
        );
    }

    #[test]
    fn test_handle_outlives_core() {
        let (core, _) = started();
        let handle = core.handle();
        drop(core);

        assert_eq!(handle.toggle_sleep_timer(), Err(PlaybackError::CoreStopped));
        assert_eq!(handle.flush(), Err(PlaybackError::CoreStopped));
        assert_eq!(handle.play_state(), PlayState::Stopped);
    }
}
