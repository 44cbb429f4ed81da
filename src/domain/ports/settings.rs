//! Port for application settings

use serde_yaml::Value;
use std::path::Path;

/// Settings surface consumed while loading and applying logging configuration
///
/// Implementors expose named values explicitly through [`lookup`] instead of
/// attribute reflection. Unknown names return `None`, which resolves a
/// `{{name}}` reference to null rather than failing.
///
/// [`lookup`]: LoggingSettings::lookup
pub trait LoggingSettings {
    /// Prefix prepended to every derived override variable name
    fn env_prefix(&self) -> &str;

    /// Configured location of the logging configuration file
    fn settings_path(&self) -> &Path;

    /// Value of the named setting, if it exists
    fn lookup(&self, name: &str) -> Option<Value>;

    /// Loggers that copy their configuration from the extra template logger
    fn extra_loggers(&self) -> Vec<String>;
}
