//! Player configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Player preferences and behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Distance covered by rewind / fast-forward, in seconds
    pub seek_time_secs: u64,

    /// Length of a freshly started sleep timer, in minutes
    pub sleep_timer_minutes: u64,

    /// Sleep timer countdown granularity in milliseconds
    pub sleep_tick_ms: u64,

    /// Add a bookmark at the current position whenever the sleep timer starts
    pub bookmark_on_sleep_timer: bool,

    /// Playback speed applied when the core starts (0.5 - 2.0)
    pub default_speed: f32,
}

impl PlayerConfig {
    pub fn seek_time(&self) -> Duration {
        Duration::from_secs(self.seek_time_secs)
    }

    pub fn sleep_timer_duration(&self) -> Duration {
        Duration::from_secs(self.sleep_timer_minutes * 60)
    }

    pub fn sleep_tick(&self) -> Duration {
        Duration::from_millis(self.sleep_tick_ms)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            seek_time_secs: 20,
            sleep_timer_minutes: 20,
            sleep_tick_ms: 1000,
            bookmark_on_sleep_timer: false,
            default_speed: 1.0,
        }
    }
}

impl ConfigSection for PlayerConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(self.seek_time_secs, 1, 120, "player.seek_time_secs"),
            Validator::in_range(self.sleep_timer_minutes, 1, 240, "player.sleep_timer_minutes"),
            Validator::in_range(self.sleep_tick_ms, 10, 60_000, "player.sleep_tick_ms"),
            Validator::in_range(self.default_speed, 0.5, 2.0, "player.default_speed"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.seek_time_secs = other.seek_time_secs;
        self.sleep_timer_minutes = other.sleep_timer_minutes;
        self.sleep_tick_ms = other.sleep_tick_ms;
        self.bookmark_on_sleep_timer = other.bookmark_on_sleep_timer;
        self.default_speed = other.default_speed;
    }

    fn section_name(&self) -> &'static str {
        "player"
    }
}
