//! Run configuration loaded from a JSON file.
//!
//! # Responsibility
//! - Deserialize and validate the filer paths and options.
//! - Hand one immutable value to every component that needs a path.
//!
//! # Invariants
//! - `first_day_of_week` is within `0..=6` (0 = Monday).
//! - `log_dir`, when set, is absolute.

use chrono::Weekday;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
/// Sunday, using 0 = Monday numbering.
pub const DEFAULT_FIRST_DAY_OF_WEEK: u8 = 6;

/// Errors raised while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid JSON or misses required keys.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Config parsed but holds an out-of-range value.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Paths and options for one filer run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilerConfig {
    /// Flat directory scanned for new items.
    pub inbox_path: PathBuf,
    /// Destination of notebooks; holds one subdirectory per notebook.
    pub notebooks_path: PathBuf,
    /// Destination of boxes and their `<box>.md` index files.
    pub boxes_path: PathBuf,
    /// Master index listing every filed box.
    pub boxes_file: PathBuf,
    /// Weekly digest, rewritten on every run.
    pub last_modified_notes_file: PathBuf,
    /// Digest week anchor, 0 = Monday .. 6 = Sunday.
    #[serde(default = "default_first_day_of_week")]
    pub first_day_of_week: u8,
    /// Also refuse to overwrite existing boxes and notebooks.
    #[serde(default)]
    pub strict_collisions: bool,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_first_day_of_week() -> u8 {
    DEFAULT_FIRST_DAY_OF_WEEK
}

impl FilerConfig {
    /// Builds a config with the five required paths and default options.
    pub fn new(
        inbox_path: impl Into<PathBuf>,
        notebooks_path: impl Into<PathBuf>,
        boxes_path: impl Into<PathBuf>,
        boxes_file: impl Into<PathBuf>,
        last_modified_notes_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            inbox_path: inbox_path.into(),
            notebooks_path: notebooks_path.into(),
            boxes_path: boxes_path.into(),
            boxes_file: boxes_file.into(),
            last_modified_notes_file: last_modified_notes_file.into(),
            first_day_of_week: DEFAULT_FIRST_DAY_OF_WEEK,
            strict_collisions: false,
            log_level: None,
            log_dir: None,
        }
    }

    /// Reads and validates a JSON config file.
    ///
    /// # Errors
    /// - `ConfigError::Io` when the file cannot be read.
    /// - `ConfigError::Parse` for malformed JSON or missing required keys.
    /// - `ConfigError::Invalid` for out-of-range option values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.week_start()?;
        if let Some(log_dir) = &self.log_dir {
            if !log_dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    log_dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Digest week anchor as a `chrono::Weekday`.
    pub fn week_start(&self) -> Result<Weekday, ConfigError> {
        Weekday::try_from(self.first_day_of_week).map_err(|_| {
            ConfigError::Invalid(format!(
                "first_day_of_week must be within 0..=6, got {}",
                self.first_day_of_week
            ))
        })
    }
}
