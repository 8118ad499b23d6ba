//! Runtime settings of a running core

use earshot_config::PlayerConfig;
use earshot_core::PlaybackSpeed;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct CoreSettings {
    /// Distance covered by rewind / fast-forward
    pub seek_time: Duration,
    /// Length of a freshly started sleep timer
    pub sleep_duration: Duration,
    /// Sleep timer tick interval
    pub sleep_tick: Duration,
    pub bookmark_on_sleep_timer: bool,
    pub default_speed: PlaybackSpeed,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self::from(&PlayerConfig::default())
    }
}

impl From<&PlayerConfig> for CoreSettings {
    fn from(config: &PlayerConfig) -> Self {
        let default_speed = PlaybackSpeed::new(config.default_speed).unwrap_or_else(|e| {
            log::warn!("Ignoring configured playback speed: {}", e);
            PlaybackSpeed::default()
        });

        Self {
            seek_time: config.seek_time(),
            sleep_duration: config.sleep_timer_duration(),
            sleep_tick: config.sleep_tick(),
            bookmark_on_sleep_timer: config.bookmark_on_sleep_timer,
            default_speed,
        }
    }
}
