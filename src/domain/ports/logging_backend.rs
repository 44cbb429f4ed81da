//! Port for the logging subsystem

use crate::domain::errors::ApplyError;
use crate::domain::models::{ConfigTree, LogLevel};

/// Name under which the root logger is addressed
pub const ROOT_LOGGER: &str = "root";

/// Point-in-time view of a named logger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerSnapshot {
    /// Dotted logger name
    pub name: String,
    /// Level set directly on the logger (`NotSet` when inherited)
    pub level: LogLevel,
    /// Level in force after walking up the dotted-name hierarchy
    pub effective_level: LogLevel,
    /// Names of the handlers attached to this logger
    pub handlers: Vec<String>,
    /// Whether records also reach ancestor handlers
    pub propagate: bool,
    /// Set when an earlier logger was disabled by a later description
    pub disabled: bool,
}

impl LoggerSnapshot {
    /// Snapshot of a logger nobody has configured yet
    pub fn unconfigured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: LogLevel::NotSet,
            effective_level: LogLevel::NotSet,
            handlers: Vec::new(),
            propagate: true,
            disabled: false,
        }
    }
}

/// Port trait for the logging subsystem that receives a resolved configuration
///
/// `configure` is the single bulk "apply structured description" call. The
/// per-logger mutators are used afterwards to copy the template logger onto
/// extra loggers, and `activate` runs once all mutation is done.
pub trait LoggingBackend {
    /// Apply a structured logging description
    fn configure(&mut self, config: &ConfigTree) -> Result<(), ApplyError>;

    /// Current state of the named logger
    fn logger(&self, name: &str) -> LoggerSnapshot;

    /// Attach an already configured handler to a logger (no-op if attached)
    fn attach_handler(&mut self, logger: &str, handler: &str) -> Result<(), ApplyError>;

    /// Set the logger's own level
    fn set_level(&mut self, logger: &str, level: LogLevel);

    /// Set whether the logger propagates to its ancestors
    fn set_propagate(&mut self, logger: &str, propagate: bool);

    /// Make the configuration live
    fn activate(&mut self) -> Result<(), ApplyError> {
        Ok(())
    }
}
