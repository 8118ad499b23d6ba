//! Play state store

use crate::observer::{Publisher, Subscription};
use earshot_core::PlayState;
use std::sync::atomic::{AtomicU8, Ordering};

/// Current play/pause/stopped state plus its change stream
pub struct PlayStateStore {
    current: AtomicU8,
    publisher: Publisher<PlayState>,
}

impl PlayStateStore {
    pub fn new() -> Self {
        Self {
            current: AtomicU8::new(PlayState::Stopped.as_u8()),
            publisher: Publisher::new(),
        }
    }

    pub fn current(&self) -> PlayState {
        PlayState::from_u8(self.current.load(Ordering::Acquire))
    }

    pub fn subscribe(&self) -> Subscription<PlayState> {
        self.publisher.subscribe()
    }

    /// Switches to `state`, notifying subscribers if it changed
    pub fn set(&self, state: PlayState) -> bool {
        let previous = PlayState::from_u8(self.current.swap(state.as_u8(), Ordering::AcqRel));
        if previous == state {
            return false;
        }

        log::debug!("Play state {} -> {}", previous, state);
        self.publisher.publish(&state);
        true
    }
}

impl Default for PlayStateStore {
    fn default() -> Self {
        Self::new()
    }
}
