//! Earshot configuration
//!
//! A versioned TOML file holding the application and player preferences the
//! playback core reads at startup (seek step, sleep timer length, whether a
//! bookmark is dropped when the sleep timer starts, ...).
//!
//! - Every section implements [`ConfigSection`] for validation and merging
//! - Invalid files fall back to defaults with a warning via `load_or_default`
//! - Writes go through a temp file and an atomic rename
//!
//! # Example
//!
//! ```rust,no_run
//! use earshot_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("config directory");
//! let config = manager.load_or_default();
//! println!("Sleep timer: {} min", config.player.sleep_timer_minutes);
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

pub mod app_config;
mod player_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use player_config::PlayerConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Player preferences
    pub player: PlayerConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every section, returning all errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.player.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges another config into this one, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.player.merge(other.player);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_version_is_set() {
        assert_eq!(Config::default().version, CONFIG_VERSION);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        let mut other = Config::default();
        other.player.seek_time_secs = 45;

        base.merge(other);
        assert_eq!(base.player.seek_time_secs, 45);
    }

    #[test]
    fn test_validate_collects_errors_across_sections() {
        let mut config = Config::default();
        config.player.seek_time_secs = 0;
        config.app.library_path = Default::default();

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
