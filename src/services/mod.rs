//! Override resolution and once-per-process setup

pub mod config_resolver;
pub mod setup_guard;

pub use config_resolver::{env_override_key, settings_reference, ConfigResolver};
pub use setup_guard::{ConfigDiff, DiffEntry, SetupGuard, SetupOutcome, EXTRA_TEMPLATE_LOGGER};
