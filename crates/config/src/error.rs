//! Errors from loading, validating and saving `config.toml`

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while reading or writing the Earshot config
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read, or is blank
    #[error("Cannot read Earshot config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing the config, its `.toml.backup` copy, its temp file or its
    /// directory failed; `path` names whichever of those it was
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not TOML, or a field has the wrong type
    #[error("Earshot config at {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The config could not be rendered as TOML
    #[error("Cannot render config as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Save refused because some fields are out of range
    #[error("Refusing to save config: {}", join_fields(.0))]
    Invalid(Vec<ValidationError>),

    /// There is no directory to keep `config.toml` in
    #[error("No config directory for Earshot: {reason}")]
    NoConfigDir { reason: String },
}

impl ConfigError {
    /// Field paths of the values a save was refused for
    pub fn invalid_fields(&self) -> Vec<&str> {
        match self {
            Self::Invalid(errors) => errors.iter().map(|e| e.field.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

fn join_fields(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One out-of-range or missing value in the config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the field, e.g. `player.seek_time_secs`
    pub field: String,

    /// What the value has to satisfy
    pub message: String,

    /// The rejected value, when there is one to show
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    /// Records the rejected value alongside the message
    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: Some(value.to_string()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)?;
        match &self.value {
            Some(value) => write!(f, ", found {}", value),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ValidationError {}
