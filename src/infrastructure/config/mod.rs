//! Configuration management infrastructure
//!
//! - Settings loading with figment (defaults, YAML file, environment)
//! - Logging configuration file selection and parsing
//! - Process environment access

pub mod environment;
pub mod loader;
pub mod source;

pub use environment::ProcessEnvironment;
pub use loader::{ConfigError, SettingsLoader};
pub use source::{ConfigSource, LogConfigLoader, DEFAULT_LOGGING_CONFIG};
