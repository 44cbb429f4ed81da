//! logcfg - structured logging configuration with environment overrides
//!
//! Loads a logging description from a YAML file, lets environment variables
//! override any leaf, substitutes `{{name}}` references with application
//! settings, and applies the result once per process.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): configuration trees, settings, errors and ports
//! - **Service Layer** (`services`): override resolution and the setup guard
//! - **Infrastructure Layer** (`infrastructure`): file/settings loading, logger
//!   registry and the `tracing` subscriber backend
//! - **Application Layer** (`application`): the composed setup entry point
//!
//! # Example
//!
//! ```no_run
//! use logcfg::{setup_logging, SettingsLoader, SetupGuard, TracingBackend};
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = SettingsLoader::load()?;
//!     let guard = SetupGuard::new();
//!     let mut backend = TracingBackend::new();
//!     setup_logging(&settings, &guard, &mut backend)?;
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{setup_logging, LoggingSetup};
pub use domain::errors::{ApplyError, LogConfigError, SetupError};
pub use domain::models::{
    flatten, unflatten, ConfigTree, FlatConfig, FlatKey, LogLevel, ResolvedConfig, Settings,
};
pub use domain::ports::{EnvironmentSource, LoggerSnapshot, LoggingBackend, LoggingSettings};
pub use infrastructure::config::{
    ConfigError, ConfigSource, LogConfigLoader, ProcessEnvironment, SettingsLoader,
};
pub use infrastructure::logging::{LoggerRegistry, TracingBackend};
pub use services::{ConfigDiff, ConfigResolver, SetupGuard, SetupOutcome};
