//! Application layer: composes configuration loading and the setup guard
//! into the process-level logging setup entry point.

pub mod logging_setup;

pub use logging_setup::{setup_logging, LoggingSetup};
