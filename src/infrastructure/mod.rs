//! Infrastructure layer module
//!
//! Adapters for the outside world:
//! - Configuration management (settings, configuration files, environment)
//! - Logging subsystem (registry and tracing subscriber)
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod logging;
