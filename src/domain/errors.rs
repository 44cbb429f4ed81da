//! Error types for loading and applying logging configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, reading or parsing a configuration file
#[derive(Debug, Error)]
pub enum LogConfigError {
    #[error(
        "logging configuration not found at {} and the default {} is missing too",
        .path.display(),
        .fallback.display()
    )]
    /// Neither the configured file nor the fallback exists
    NotFound {
        /// Configured settings path
        path: PathBuf,
        /// Fallback that was tried next
        fallback: PathBuf,
    },

    #[error("failed to read logging configuration {}: {source}", .path.display())]
    /// The file exists but could not be read
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse logging configuration {}: {message}", .path.display())]
    /// The file is not a mapping with string keys
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Parser message
        message: String,
    },
}

/// Rejections raised by the logging subsystem when applying a configuration
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("unsupported logging configuration version: {0}")]
    /// `version` is missing or not `1`
    UnsupportedVersion(String),

    #[error("invalid '{section}' section: {message}")]
    /// A section has the wrong shape
    InvalidSection {
        /// Section name, `<root>` for the whole document
        section: String,
        /// Deserializer message
        message: String,
    },

    #[error("invalid level for {target}: {value}")]
    /// A level is neither a known name nor a known number
    InvalidLevel {
        /// Logger or handler carrying the level
        target: String,
        /// Rejected value
        value: String,
    },

    #[error("invalid value for {target}.{field}: {value}")]
    /// A flag or option could not be interpreted
    InvalidValue {
        /// Logger or handler carrying the field
        target: String,
        /// Field name
        field: String,
        /// Rejected value
        value: String,
    },

    #[error("handler '{0}' has no class")]
    /// A handler section has no `class`
    MissingHandlerClass(String),

    #[error("logger '{logger}' references unknown handler '{handler}'")]
    /// A logger names a handler that is not defined
    UnknownHandler {
        /// Referencing logger
        logger: String,
        /// Missing handler
        handler: String,
    },

    #[error("handler '{handler}' references unknown formatter '{formatter}'")]
    /// A handler names a formatter that is not defined
    UnknownFormatter {
        /// Referencing handler
        handler: String,
        /// Missing formatter
        formatter: String,
    },

    #[error("failed to initialise handler '{handler}': {message}")]
    /// A handler's output could not be opened
    HandlerInit {
        /// Failing handler
        handler: String,
        /// Underlying failure
        message: String,
    },

    #[error("failed to install logging subscriber: {0}")]
    /// A global subscriber is already installed
    SubscriberInstall(String),
}

/// Errors surfaced by the composed setup entry point
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    /// Locating or reading the configuration failed
    Config(#[from] LogConfigError),

    #[error(transparent)]
    /// The backend rejected the configuration
    Apply(#[from] ApplyError),
}

/// Result of the composed setup entry point
pub type SetupResult<T> = Result<T, SetupError>;
