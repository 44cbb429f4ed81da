//! Once-per-process application of a resolved logging configuration

use serde_yaml::Value;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::domain::errors::ApplyError;
use crate::domain::models::{LogLevel, ResolvedConfig};
use crate::domain::ports::{LoggingBackend, LoggingSettings};

/// Logger whose handlers, level and propagation are copied onto extra loggers
pub const EXTRA_TEMPLATE_LOGGER: &str = "logcfg.extra";

/// What [`SetupGuard::apply_once`] did with a configuration
#[derive(Debug, Clone, PartialEq)]
pub enum SetupOutcome {
    /// First call: the configuration was applied and recorded
    Applied,
    /// Already configured with an identical configuration
    SkippedIdentical,
    /// Already configured with a different configuration, which was ignored
    SkippedConflicting(ConfigDiff),
}

/// One top-level key whose value differs between two configurations
#[derive(Debug, Clone, PartialEq)]
pub struct DiffEntry {
    /// Top-level key
    pub key: String,
    /// Value in the applied configuration (`None` if the key was absent)
    pub previous: Option<Value>,
    /// Value in the rejected configuration (`None` if the key was absent)
    pub attempted: Option<Value>,
}

/// Shallow difference between two configurations, by top-level key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDiff {
    entries: Vec<DiffEntry>,
}

impl ConfigDiff {
    /// Keys of `attempted` then keys only in `previous`, whose values differ
    pub fn between(previous: &ResolvedConfig, attempted: &ResolvedConfig) -> Self {
        let mut entries: Vec<DiffEntry> = attempted
            .keys()
            .filter(|key| previous.get(key) != attempted.get(key))
            .map(|key| DiffEntry {
                key: key.to_string(),
                previous: previous.get(key).cloned(),
                attempted: attempted.get(key).cloned(),
            })
            .collect();

        entries.extend(
            previous
                .keys()
                .filter(|key| attempted.get(key).is_none())
                .map(|key| DiffEntry {
                    key: key.to_string(),
                    previous: previous.get(key).cloned(),
                    attempted: None,
                }),
        );

        Self { entries }
    }

    /// Whether the configurations are identical
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Differing keys with both values
    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    /// Differing top-level keys
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.key.as_str()).collect()
    }
}

impl fmt::Display for ConfigDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("logging can only be configured once per process, the new logging config will be ignored. The attempted changes were: ")?;
        for (index, entry) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            match &entry.attempted {
                None => write!(f, "{}=<removed>", entry.key)?,
                Some(value) => match serde_json::to_string(value) {
                    Ok(json) => write!(f, "{}={json}", entry.key)?,
                    Err(_) => write!(f, "{}={value:?}", entry.key)?,
                },
            }
        }
        Ok(())
    }
}

/// Tracks whether logging has been configured and applies a configuration
/// at most once
///
/// The guard is `UNCONFIGURED` until the first successful
/// [`apply_once`](Self::apply_once) and `CONFIGURED` afterwards. The check
/// and the transition happen under one lock, so concurrent callers cannot
/// both apply.
#[derive(Debug)]
pub struct SetupGuard {
    active: Mutex<Option<ResolvedConfig>>,
    template_logger: String,
}

impl Default for SetupGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupGuard {
    /// Unconfigured guard using the `logcfg.extra` template logger
    pub fn new() -> Self {
        Self::with_template_logger(EXTRA_TEMPLATE_LOGGER)
    }

    /// Guard copying extra loggers from a different template logger
    pub fn with_template_logger(name: impl Into<String>) -> Self {
        Self {
            active: Mutex::new(None),
            template_logger: name.into(),
        }
    }

    /// Logger copied onto extra loggers
    pub fn template_logger(&self) -> &str {
        &self.template_logger
    }

    /// Apply `config` to `backend` unless a configuration is already active
    ///
    /// On the first call the backend is configured, every logger returned by
    /// `settings.extra_loggers()` copies the template logger, the backend is
    /// activated and `config` becomes the active configuration. Later calls
    /// never touch the backend; they report whether the new configuration
    /// differs from the active one. A failed first call leaves the guard
    /// unconfigured.
    pub fn apply_once<B, S>(
        &self,
        config: ResolvedConfig,
        settings: &S,
        backend: &mut B,
    ) -> Result<SetupOutcome, ApplyError>
    where
        B: LoggingBackend + ?Sized,
        S: LoggingSettings + ?Sized,
    {
        let mut active = self.lock();

        if let Some(previous) = active.as_ref() {
            let diff = ConfigDiff::between(previous, &config);
            if diff.is_empty() {
                debug!("logging already configured with an identical configuration");
                return Ok(SetupOutcome::SkippedIdentical);
            }
            return Ok(SetupOutcome::SkippedConflicting(diff));
        }

        backend.configure(&config)?;
        self.copy_template(backend, &settings.extra_loggers())?;
        backend.activate()?;

        *active = Some(config);
        Ok(SetupOutcome::Applied)
    }

    fn copy_template<B>(&self, backend: &mut B, extra_loggers: &[String]) -> Result<(), ApplyError>
    where
        B: LoggingBackend + ?Sized,
    {
        let template = backend.logger(&self.template_logger);

        for name in extra_loggers {
            for handler in &template.handlers {
                backend.attach_handler(name, handler)?;
            }
            if backend.logger(name).level == LogLevel::NotSet {
                backend.set_level(name, template.effective_level);
            }
            backend.set_propagate(name, template.propagate);
            debug!(
                logger = %name,
                template = %self.template_logger,
                handlers = template.handlers.len(),
                "extra logger configured from template"
            );
        }
        Ok(())
    }

    /// Configuration applied by the first successful call, if any
    pub fn active(&self) -> Option<ResolvedConfig> {
        self.lock().clone()
    }

    /// Whether a configuration has been applied
    pub fn is_configured(&self) -> bool {
        self.lock().is_some()
    }

    /// Return to the unconfigured state
    ///
    /// Only meant for test harnesses; the backend is not reverted.
    pub fn reset(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<ResolvedConfig>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
