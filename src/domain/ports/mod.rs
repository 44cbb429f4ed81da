//! Port trait definitions (Hexagonal Architecture)
//!
//! Capabilities the logging setup core needs from the outside world:
//! - LoggingSettings: environment prefix, settings lookups, extra loggers
//! - EnvironmentSource: environment variable lookups
//! - LoggingBackend: the logging subsystem that receives the configuration
//!
//! These traits keep the resolver and the setup guard independent of process
//! globals so they can be driven directly from tests.

pub mod environment;
pub mod logging_backend;
pub mod settings;

pub use environment::EnvironmentSource;
pub use logging_backend::{LoggerSnapshot, LoggingBackend, ROOT_LOGGER};
pub use settings::LoggingSettings;
