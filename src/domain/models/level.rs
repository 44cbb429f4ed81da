//! Severity levels shared by loggers and handlers

use serde_yaml::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// Error returned when a level name or number is not recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

/// Logger and handler severity levels
///
/// Levels follow the numeric scale used by structured logging descriptions
/// (`NOTSET` = 0 up to `CRITICAL` = 50), ordered from least to most severe.
/// `NotSet` on a logger means "inherit from the nearest ancestor".
///
/// # Examples
///
/// ```
/// use logcfg::LogLevel;
///
/// assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
/// assert!(LogLevel::Error > LogLevel::Info);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Inherit the level of the nearest configured ancestor
    #[default]
    NotSet,
    /// Numeric value 5
    Trace,
    /// Numeric value 10
    Debug,
    /// Numeric value 20
    Info,
    /// Numeric value 30
    Warning,
    /// Numeric value 40
    Error,
    /// Numeric value 50
    Critical,
}

impl LogLevel {
    /// Canonical upper-case name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotSet => "NOTSET",
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Position on the numeric scale
    pub const fn as_number(&self) -> u8 {
        match self {
            Self::NotSet => 0,
            Self::Trace => 5,
            Self::Debug => 10,
            Self::Info => 20,
            Self::Warning => 30,
            Self::Error => 40,
            Self::Critical => 50,
        }
    }

    /// Level for an exact numeric value
    pub const fn from_number(number: i64) -> Option<Self> {
        match number {
            0 => Some(Self::NotSet),
            5 => Some(Self::Trace),
            10 => Some(Self::Debug),
            20 => Some(Self::Info),
            30 => Some(Self::Warning),
            40 => Some(Self::Error),
            50 => Some(Self::Critical),
            _ => None,
        }
    }

    /// Interpret a configuration value as a level
    ///
    /// Null means "not configured" and yields `Ok(None)`. Strings are matched
    /// by name, integers by their numeric value.
    pub fn from_value(value: &Value) -> Result<Option<Self>, ParseLevelError> {
        match value {
            Value::Null => Ok(None),
            Value::String(name) => name.parse().map(Some),
            Value::Number(number) => number
                .as_i64()
                .and_then(Self::from_number)
                .map(Some)
                .ok_or_else(|| ParseLevelError(number.to_string())),
            other => Err(ParseLevelError(format!("{other:?}"))),
        }
    }

    /// Most verbose `tracing` filter that lets this level through
    ///
    /// `NotSet` places no restriction.
    pub const fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::NotSet | Self::Trace => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warning => LevelFilter::WARN,
            Self::Error | Self::Critical => LevelFilter::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NOTSET" => Ok(Self::NotSet),
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
