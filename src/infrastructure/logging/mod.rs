//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - Structured description parsing (formatters, handlers, loggers)
//! - In-memory logger registry with dotted-name hierarchy
//! - Subscriber installation with per-handler target filters
//! - File handlers through tracing-appender

pub mod config;
pub mod registry;
pub mod tracing_backend;

pub use config::{LogFormat, LoggingDescription, RotationPolicy};
pub use registry::{Formatter, Handler, LoggerRegistry};
pub use tracing_backend::TracingBackend;
