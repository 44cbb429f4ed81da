//! Application settings loading with figment

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::{LogLevel, Settings, ENV_PREFIX};

/// Settings fields that may be set through `LOGCFG_LOGGING_*` variables
///
/// Other variables under the same prefix are logging configuration
/// overrides and must not leak into the settings.
const ENV_FIELDS: &[&str] = &[
    "level",
    "internal_level",
    "settings_path",
    "extra_loggers",
    "colors",
];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `level` or `internal_level` is not a known level
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warning, error, critical")]
    InvalidLogLevel(String),

    /// `settings_path` is empty
    #[error("Logging settings path cannot be empty")]
    EmptySettingsPath,

    /// An `extra_loggers` entry contains whitespace
    #[error("Invalid extra logger name: {0:?}")]
    InvalidExtraLogger(String),
}

/// Settings loader with hierarchical merging
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. Environment variables (`LOGCFG_LOGGING_*`, known fields only)
    pub fn load() -> Result<Settings> {
        let settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Env::prefixed(ENV_PREFIX).only(ENV_FIELDS))
            .extract()
            .context("Failed to extract logging settings from figment")?;

        Self::validate(&settings)?;
        Ok(settings)
    }

    /// Load settings from a YAML file, still letting the environment win
    ///
    /// Keys in the file that are not settings fields become named values
    /// available to `{{name}}` references.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Settings> {
        let settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).only(ENV_FIELDS))
            .extract()
            .context(format!(
                "Failed to load logging settings from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&settings)?;
        Ok(settings)
    }

    /// Validate settings after loading
    pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
        for level in [&settings.level, &settings.internal_level] {
            if level.parse::<LogLevel>().is_err() {
                return Err(ConfigError::InvalidLogLevel(level.clone()));
            }
        }

        if settings.settings_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptySettingsPath);
        }

        if let Some(name) = settings
            .get_extra_loggers()
            .into_iter()
            .find(|name| name.chars().any(char::is_whitespace))
        {
            return Err(ConfigError::InvalidExtraLogger(name));
        }

        Ok(())
    }
}
