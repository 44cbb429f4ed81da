//! Logging configuration file selection and parsing

use serde_yaml::Value;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::errors::LogConfigError;
use crate::domain::models::ConfigTree;
use crate::domain::ports::LoggingSettings;

/// Default logging configuration compiled into the crate, used when the
/// configured settings path does not exist
pub const DEFAULT_LOGGING_CONFIG: &str = include_str!("../../../logging.yml");

/// Where a logging configuration is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A file on disk
    File(PathBuf),
    /// [`DEFAULT_LOGGING_CONFIG`]
    Bundled,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Bundled => f.write_str(BUNDLED_NAME),
        }
    }
}

const BUNDLED_NAME: &str = "<bundled logging.yml>";

/// Locates and parses logging configuration files
#[derive(Debug, Clone, Default)]
pub struct LogConfigLoader {
    default_path: Option<PathBuf>,
}

impl LogConfigLoader {
    /// Loader falling back to the bundled configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Fall back to a file instead of the bundled configuration
    #[must_use]
    pub fn with_default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = Some(path.into());
        self
    }

    /// Fallback file, or `None` when the bundled configuration is used
    pub fn default_path(&self) -> Option<&Path> {
        self.default_path.as_deref()
    }

    /// Pick the configured settings path if it exists, else the default
    ///
    /// A configured file replaces the default entirely; the two are never
    /// merged.
    pub fn select_source(&self, settings: &dyn LoggingSettings) -> Result<ConfigSource, LogConfigError> {
        let configured = settings.settings_path();
        if configured.exists() {
            return Ok(ConfigSource::File(configured.to_path_buf()));
        }

        let fallback = match &self.default_path {
            None => ConfigSource::Bundled,
            Some(path) if path.exists() => ConfigSource::File(path.clone()),
            Some(path) => {
                return Err(LogConfigError::NotFound {
                    path: configured.to_path_buf(),
                    fallback: path.clone(),
                })
            }
        };
        debug!(
            configured = %configured.display(),
            default = %fallback,
            "configured logging settings path not found, using default"
        );
        Ok(fallback)
    }

    /// Read and parse the configuration at `source`
    pub fn load(source: &ConfigSource) -> Result<ConfigTree, LogConfigError> {
        match source {
            ConfigSource::File(path) => Self::read(path),
            ConfigSource::Bundled => {
                Self::parse(DEFAULT_LOGGING_CONFIG).map_err(|message| LogConfigError::Parse {
                    path: PathBuf::from(BUNDLED_NAME),
                    message,
                })
            }
        }
    }

    /// Read and parse a configuration file into a tree
    pub fn read(path: &Path) -> Result<ConfigTree, LogConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                LogConfigError::NotFound {
                    path: path.to_path_buf(),
                    fallback: path.to_path_buf(),
                }
            } else {
                LogConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let tree = Self::parse(&text).map_err(|message| LogConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        info!(path = %path.display(), keys = tree.len(), "loaded logging configuration");
        Ok(tree)
    }

    /// Parse YAML (or JSON) text into a tree
    pub fn parse(text: &str) -> Result<ConfigTree, String> {
        let value: Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
        ConfigTree::try_from(value).map_err(|e| e.to_string())
    }
}
