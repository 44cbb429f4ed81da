//! Environment override and settings reference resolution
//!
//! Every leaf of a configuration tree may be replaced from two places:
//!
//! 1. An environment variable derived from the leaf's path. A set, non-empty
//!    variable wins over the file value and is substituted verbatim as a
//!    string, whatever the original type.
//! 2. Otherwise, a string leaf of the exact form `{{name}}` is replaced by the
//!    named setting, or null when no such setting exists.
//!
//! Values that came from the environment are never treated as references.

use regex::Regex;
use serde_yaml::Value;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

use crate::domain::errors::LogConfigError;
use crate::domain::models::{unflatten, ConfigTree, FlatKey, ResolvedConfig};
use crate::domain::ports::{EnvironmentSource, LoggingSettings};
use crate::infrastructure::config::{LogConfigLoader, ProcessEnvironment};

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9a-zA-Z]+").expect("valid regex"));

// a single trailing newline is allowed so block scalars (`level: |`) match
static SETTINGS_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\{\{([\w\d_]+)\}\}\n?\z").expect("valid regex"));

/// Name of the environment variable that overrides the leaf at `key`
///
/// The prefix and the `_`-joined path are upper-cased, then every run of
/// characters outside `[0-9a-zA-Z]` collapses to a single `_`.
///
/// # Examples
///
/// ```
/// use logcfg::{FlatKey, services::env_override_key};
///
/// let key = FlatKey::new(["loggers", "vendor.lib", "level"]);
/// assert_eq!(env_override_key("APP_", &key), "APP_LOGGERS_VENDOR_LIB_LEVEL");
/// ```
pub fn env_override_key(prefix: &str, key: &FlatKey) -> String {
    let raw = format!("{prefix}{}", key.join("_")).to_uppercase();
    NON_ALPHANUMERIC.replace_all(&raw, "_").into_owned()
}

/// Setting name referenced by `value`, if it is exactly `{{name}}`,
/// optionally followed by one newline
pub fn settings_reference(value: &str) -> Option<&str> {
    if !value.starts_with("{{") {
        return None;
    }
    SETTINGS_REFERENCE
        .captures(value)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
}

/// Resolves raw configuration trees against the environment and settings
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver<E = ProcessEnvironment> {
    env: E,
}

impl ConfigResolver<ProcessEnvironment> {
    /// Resolver reading overrides from the process environment
    pub const fn new() -> Self {
        Self {
            env: ProcessEnvironment,
        }
    }
}

impl<E: EnvironmentSource> ConfigResolver<E> {
    /// Resolver reading overrides from a custom source
    pub const fn with_environment(env: E) -> Self {
        Self { env }
    }

    /// Load the file at `path` and resolve it
    pub fn resolve<S>(&self, path: &Path, settings: &S) -> Result<ResolvedConfig, LogConfigError>
    where
        S: LoggingSettings + ?Sized,
    {
        let tree = LogConfigLoader::read(path)?;
        Ok(self.resolve_tree(&tree, settings))
    }

    /// Resolve an already parsed tree
    pub fn resolve_tree<S>(&self, tree: &ConfigTree, settings: &S) -> ResolvedConfig
    where
        S: LoggingSettings + ?Sized,
    {
        let mut flat = tree.flatten();
        for (key, value) in flat.iter_mut() {
            if let Some(resolved) = self.resolve_leaf(key, value, settings) {
                *value = resolved;
            }
        }
        unflatten(flat)
    }

    /// Replacement for a single leaf, or `None` to keep it
    fn resolve_leaf<S>(&self, key: &FlatKey, value: &Value, settings: &S) -> Option<Value>
    where
        S: LoggingSettings + ?Sized,
    {
        let var = env_override_key(settings.env_prefix(), key);
        if let Some(override_value) = self.env.var(&var).filter(|v| !v.is_empty()) {
            debug!(key = %key, var = %var, "logging configuration value overridden from environment");
            return Some(Value::String(override_value));
        }

        let name = settings_reference(value.as_str()?)?;
        let resolved = settings.lookup(name);
        if resolved.is_none() {
            debug!(key = %key, setting = name, "settings reference has no value, using null");
        }
        Some(resolved.unwrap_or(Value::Null))
    }
}
