//! Earshot Playback - coordination core of the audiobook player
//!
//! Tracks the play state, per-book positions and the sleep timer, and
//! publishes changes of each as independent subscription streams. All
//! mutation runs on a single owner thread started by [`PlaybackCore`];
//! front-ends talk to it through cloneable [`PlaybackHandle`]s.

mod bookmarks;
mod chest;
mod engine;
mod error;
mod observer;
pub(crate) mod playback_thread;
mod player;
mod position;
mod settings;
mod sleep_timer;
mod state;

pub use bookmarks::{BookmarkProvider, MemoryBookmarks};
pub use chest::{BookChest, MemoryBookChest};
pub use engine::{Collaborators, PlaybackCore, PlaybackHandle};
pub use error::{InvalidRequest, PlaybackError, PlaybackResult};
pub use observer::{Publisher, Subscription};
pub use player::{NullPlayer, Player};
pub use position::{PositionChange, PositionTracker};
pub use settings::CoreSettings;
pub use sleep_timer::{SleepCountdown, SleepTimer, SleepTimerState, TickOutcome, Toggle};
pub use state::PlayStateStore;

pub use earshot_core::{PlayState, PlaybackSpeed, Position};
