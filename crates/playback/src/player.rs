//! Audio engine seen by the core

use earshot_core::{Chapter, PlaybackSpeed};

/// The thing that actually makes sound
///
/// Calls arrive from the core's owner thread only, in the order the core
/// applied them.
pub trait Player: Send + Sync {
    fn play(&self, chapter: &Chapter, offset_ms: u64);

    fn pause(&self);

    fn stop(&self);

    fn seek(&self, chapter: &Chapter, offset_ms: u64);

    fn set_speed(&self, speed: PlaybackSpeed);
}

/// Player that renders nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlayer;

impl Player for NullPlayer {
    fn play(&self, chapter: &Chapter, offset_ms: u64) {
        log::debug!("play {} @ {}ms", chapter.name, offset_ms);
    }

    fn pause(&self) {
        log::debug!("pause");
    }

    fn stop(&self) {
        log::debug!("stop");
    }

    fn seek(&self, chapter: &Chapter, offset_ms: u64) {
        log::debug!("seek {} @ {}ms", chapter.name, offset_ms);
    }

    fn set_speed(&self, speed: PlaybackSpeed) {
        log::debug!("speed {}", speed.value());
    }
}
