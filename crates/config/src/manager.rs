//! Configuration manager - main API for config operations

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.toml";

/// Loads, saves and locates the Earshot config file
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the platform config directory
    ///
    /// - Linux: `~/.config/earshot/`
    /// - macOS: `~/Library/Application Support/earshot/`
    /// - Windows: `%APPDATA%\earshot\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Self::with_directory(config_dir)
    }

    /// Creates a manager for a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let persistence = ConfigPersistence::new(config_dir.join(CONFIG_FILE));

        Ok(Self {
            persistence,
            config_dir,
        })
    }

    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "earshot")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::NoConfigDir {
                reason: "Could not determine user config directory".to_string(),
            })
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Resolves a path from the config against the config directory
    pub fn resolve(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }

    /// Loads the config file; a missing file yields the defaults
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Loads the config file, logging and falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Validates and atomically saves the config
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Loads, modifies and saves the config in one step
    ///
    /// ```rust,no_run
    /// # use earshot_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.player.bookmark_on_sleep_timer = true;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes a default config file unless one exists
    ///
    /// Returns `Ok(true)` when a file was created.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.save(&Config::default())?;
        Ok(true)
    }

    /// Overwrites the config file with the defaults
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Returns human-readable validation errors for the stored config
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the config and applies `EARSHOT_*` environment overrides
    ///
    /// Recognised variables: `EARSHOT_PLAYER_SEEK_TIME_SECS`,
    /// `EARSHOT_PLAYER_SLEEP_TIMER_MINUTES`, `EARSHOT_PLAYER_SLEEP_TICK_MS`,
    /// `EARSHOT_PLAYER_BOOKMARK_ON_SLEEP_TIMER`, `EARSHOT_PLAYER_DEFAULT_SPEED`
    /// and `EARSHOT_APP_LIBRARY_PATH`. Unparsable values are ignored.
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        if let Err(errors) = config.validate() {
            log::warn!(
                "Config validation warnings after env overrides: {:?}",
                errors
            );
        }

        Ok(config)
    }
}

fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let player = &mut config.player;
    if let Some(v) = lookup("EARSHOT_PLAYER_SEEK_TIME_SECS").and_then(|s| s.parse().ok()) {
        player.seek_time_secs = v;
    }
    if let Some(v) = lookup("EARSHOT_PLAYER_SLEEP_TIMER_MINUTES").and_then(|s| s.parse().ok()) {
        player.sleep_timer_minutes = v;
    }
    if let Some(v) = lookup("EARSHOT_PLAYER_SLEEP_TICK_MS").and_then(|s| s.parse().ok()) {
        player.sleep_tick_ms = v;
    }
    if let Some(v) = lookup("EARSHOT_PLAYER_BOOKMARK_ON_SLEEP_TIMER").and_then(|s| s.parse().ok())
    {
        player.bookmark_on_sleep_timer = v;
    }
    if let Some(v) = lookup("EARSHOT_PLAYER_DEFAULT_SPEED").and_then(|s| s.parse().ok()) {
        player.default_speed = v;
    }
    if let Some(path) = lookup("EARSHOT_APP_LIBRARY_PATH") {
        config.app.library_path = PathBuf::from(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn setup_test_manager() -> (TempDir, ConfigManager) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())
            .expect("Failed to create manager");
        (temp_dir, manager)
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let (_temp_dir, manager) = setup_test_manager();
        assert_eq!(manager.load_or_default(), Config::default());
    }

    #[test]
    fn test_load_or_default_with_corrupt_file() {
        let (_temp_dir, manager) = setup_test_manager();
        std::fs::write(manager.config_path(), "not [valid").unwrap();
        assert_eq!(manager.load_or_default(), Config::default());
    }

    #[test]
    fn test_update() {
        let (_temp_dir, manager) = setup_test_manager();
        manager.save(&Config::default()).expect("Should save");

        manager
            .update(|config| config.player.seek_time_secs = 30)
            .expect("Should update");

        assert_eq!(manager.load().unwrap().player.seek_time_secs, 30);
    }

    #[test]
    fn test_initialize_only_once() {
        let (_temp_dir, manager) = setup_test_manager();

        assert!(manager.initialize().expect("Should initialize"));
        assert!(manager.config_path().exists());
        assert!(!manager.initialize().expect("Should initialize"));
    }

    #[test]
    fn test_reset() {
        let (_temp_dir, manager) = setup_test_manager();

        let mut config = Config::default();
        config.player.sleep_timer_minutes = 90;
        manager.save(&config).expect("Should save");

        manager.reset().expect("Should reset");
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn test_validate_stored_config() {
        let (_temp_dir, manager) = setup_test_manager();
        manager.save(&Config::default()).expect("Should save");
        assert!(manager.validate().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let (temp_dir, manager) = setup_test_manager();
        let relative = manager.resolve(std::path::Path::new("library.json"));
        assert_eq!(relative, temp_dir.path().join("library.json"));

        let absolute = temp_dir.path().join("elsewhere.json");
        assert_eq!(manager.resolve(&absolute), absolute);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("EARSHOT_PLAYER_SEEK_TIME_SECS", "10"),
            ("EARSHOT_PLAYER_BOOKMARK_ON_SLEEP_TIMER", "true"),
            ("EARSHOT_PLAYER_DEFAULT_SPEED", "fast"),
            ("EARSHOT_APP_LIBRARY_PATH", "/srv/books.json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.player.seek_time_secs, 10);
        assert!(config.player.bookmark_on_sleep_timer);
        assert_eq!(config.player.default_speed, 1.0);
        assert_eq!(config.app.library_path, PathBuf::from("/srv/books.json"));
    }
}
