//! Reading and writing the config file
//!
//! Saves validate first, back up the previous file, then write through a
//! temp file in the same directory and rename it into place.

use crate::{Config, ConfigError, ConfigResult, CONFIG_VERSION};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct ConfigPersistence {
    config_path: PathBuf,
}

impl ConfigPersistence {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Loads the config file, or the defaults if it does not exist yet
    ///
    /// Blank and unparsable files are errors. Out-of-range values only warn
    /// so the user can still fix them by hand.
    pub fn load(&self) -> ConfigResult<Config> {
        if !self.config_path.exists() {
            log::info!(
                "Config file not found at {}, using defaults",
                self.config_path.display()
            );
            return Ok(Config::default());
        }

        let contents =
            fs::read_to_string(&self.config_path).map_err(|e| ConfigError::Read {
                path: self.config_path.clone(),
                source: e,
            })?;

        if contents.trim().is_empty() {
            return Err(ConfigError::Read {
                path: self.config_path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "Config file is empty",
                ),
            });
        }

        let mut config: Config =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: self.config_path.clone(),
                source: e,
            })?;

        if config.version != CONFIG_VERSION {
            log::warn!(
                "Config version {} differs from supported version {}, reading it as-is",
                config.version,
                CONFIG_VERSION
            );
            config.version = CONFIG_VERSION;
        }

        if let Err(errors) = config.validate() {
            let error_msg = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            log::warn!("Config validation warnings: {}", error_msg);
        }

        Ok(config)
    }

    /// Validates and atomically writes the config
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        config.validate().map_err(ConfigError::Invalid)?;

        if let Some(parent) = self.config_path.parent() {
            self.ensure_directory_exists(parent)?;
        }

        if self.config_path.exists() {
            self.backup_config()?;
        }

        let toml_string = toml::to_string_pretty(config)?;
        let temp_file = self.create_temp_file()?;
        self.write_atomic(temp_file, &toml_string)?;

        log::info!("Config saved to {}", self.config_path.display());
        Ok(())
    }

    fn ensure_directory_exists(&self, path: &Path) -> ConfigResult<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| ConfigError::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
            log::info!("Created config directory: {}", path.display());
        }
        Ok(())
    }

    fn backup_config(&self) -> ConfigResult<()> {
        let backup_path = self.config_path.with_extension("toml.backup");
        fs::copy(&self.config_path, &backup_path).map_err(|e| ConfigError::Write {
            path: backup_path.clone(),
            source: e,
        })?;
        log::debug!("Backed up config to {}", backup_path.display());
        Ok(())
    }

    fn create_temp_file(&self) -> ConfigResult<NamedTempFile> {
        let dir = self
            .config_path
            .parent()
            .ok_or_else(|| ConfigError::NoConfigDir {
                reason: format!("{} has no parent", self.config_path.display()),
            })?;

        NamedTempFile::new_in(dir).map_err(|e| ConfigError::Write {
            path: dir.to_path_buf(),
            source: e,
        })
    }

    fn write_atomic(&self, mut temp_file: NamedTempFile, content: &str) -> ConfigResult<()> {
        let temp_path = temp_file.path().to_path_buf();
        let written = temp_file.write_all(content.as_bytes());
        written
            .and_then(|()| temp_file.flush())
            .map_err(|e| ConfigError::Write {
                path: temp_path,
                source: e,
            })?;

        temp_file
            .persist(&self.config_path)
            .map_err(|e| ConfigError::Write {
                path: self.config_path.clone(),
                source: e.error,
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_dir() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        (temp_dir, config_path)
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let (_temp_dir, config_path) = setup_test_dir();
        let persistence = ConfigPersistence::new(config_path);

        let config = persistence.load().expect("Should load default config");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let (_temp_dir, config_path) = setup_test_dir();
        let persistence = ConfigPersistence::new(config_path);

        let mut config = Config::default();
        config.player.sleep_timer_minutes = 35;

        persistence.save(&config).expect("Should save config");
        let loaded = persistence.load().expect("Should load config");

        assert_eq!(loaded.player.sleep_timer_minutes, 35);
    }

    #[test]
    fn test_save_creates_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("config.toml");
        let persistence = ConfigPersistence::new(config_path.clone());

        persistence
            .save(&Config::default())
            .expect("Should create directory and save");

        assert!(config_path.exists());
    }

    #[test]
    fn test_backup_created_on_overwrite() {
        let (_temp_dir, config_path) = setup_test_dir();
        let persistence = ConfigPersistence::new(config_path.clone());

        persistence.save(&Config::default()).expect("first save");
        persistence.save(&Config::default()).expect("second save");

        assert!(config_path.with_extension("toml.backup").exists());
    }

    #[test]
    fn test_unparsable_file_is_parse_error() {
        let (_temp_dir, config_path) = setup_test_dir();
        fs::write(&config_path, "player = {{{").expect("Should write file");

        let result = ConfigPersistence::new(config_path).load();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_blank_file_is_read_error() {
        let (_temp_dir, config_path) = setup_test_dir();
        fs::write(&config_path, "   \n").expect("Should write file");

        let result = ConfigPersistence::new(config_path).load();
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_invalid_values_are_not_saved() {
        let (_temp_dir, config_path) = setup_test_dir();
        let persistence = ConfigPersistence::new(config_path.clone());

        let mut config = Config::default();
        config.player.seek_time_secs = 0;

        let err = persistence.save(&config).unwrap_err();
        assert_eq!(err.invalid_fields(), vec!["player.seek_time_secs"]);
        assert!(!config_path.exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let (_temp_dir, config_path) = setup_test_dir();
        fs::write(&config_path, "[player]\nbookmark_on_sleep_timer = true\n")
            .expect("Should write file");

        let config = ConfigPersistence::new(config_path).load().unwrap();
        assert!(config.player.bookmark_on_sleep_timer);
        assert_eq!(config.player.seek_time_secs, 20);
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn test_backup_failure_is_write_error() {
        let (_temp_dir, config_path) = setup_test_dir();
        let persistence = ConfigPersistence::new(config_path.clone());
        persistence.save(&Config::default()).expect("first save");

        // a directory where the backup file should go
        let backup_path = config_path.with_extension("toml.backup");
        fs::create_dir(&backup_path).expect("Should create directory");

        match persistence.save(&Config::default()) {
            Err(ConfigError::Write { path, .. }) => assert_eq!(path, backup_path),
            other => panic!("expected write error, got {:?}", other),
        }
    }
}
