//! Process-level logging setup

use tracing::{info, warn};

use crate::domain::errors::SetupResult;
use crate::domain::ports::{EnvironmentSource, LoggingBackend, LoggingSettings};
use crate::infrastructure::config::{LogConfigLoader, ProcessEnvironment};
use crate::services::{ConfigResolver, SetupGuard, SetupOutcome};

/// Loads, resolves and applies logging configuration for a process
///
/// Composes path selection, override resolution and the setup guard. A
/// conflicting repeated setup is reported with a warning and otherwise
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct LoggingSetup<E = ProcessEnvironment> {
    loader: LogConfigLoader,
    resolver: ConfigResolver<E>,
}

impl LoggingSetup<ProcessEnvironment> {
    /// Setup with the bundled fallback and the process environment
    pub fn new() -> Self {
        Self {
            loader: LogConfigLoader::new(),
            resolver: ConfigResolver::new(),
        }
    }
}

impl<E: EnvironmentSource> LoggingSetup<E> {
    /// Read overrides from `env` instead of the process environment
    pub fn with_environment<F: EnvironmentSource>(self, env: F) -> LoggingSetup<F> {
        LoggingSetup {
            loader: self.loader,
            resolver: ConfigResolver::with_environment(env),
        }
    }

    /// Select configuration files with `loader`
    #[must_use]
    pub fn with_loader(mut self, loader: LogConfigLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Select, resolve and apply the configuration for `settings`
    ///
    /// A repeated call with a different configuration is logged as a warning
    /// naming the differing keys and returns
    /// [`SetupOutcome::SkippedConflicting`].
    pub fn run<S, B>(&self, settings: &S, guard: &SetupGuard, backend: &mut B) -> SetupResult<SetupOutcome>
    where
        S: LoggingSettings,
        B: LoggingBackend + ?Sized,
    {
        let source = self.loader.select_source(settings)?;
        let tree = LogConfigLoader::load(&source)?;
        let config = self.resolver.resolve_tree(&tree, settings);
        let outcome = guard.apply_once(config, settings, backend)?;

        match &outcome {
            SetupOutcome::Applied => {
                info!(source = %source, "logging configured");
            }
            SetupOutcome::SkippedIdentical => {}
            SetupOutcome::SkippedConflicting(diff) => {
                warn!(keys = ?diff.keys(), "{diff}");
            }
        }
        Ok(outcome)
    }
}

/// Set up logging from `settings` with the default loader and the process
/// environment
pub fn setup_logging<S, B>(settings: &S, guard: &SetupGuard, backend: &mut B) -> SetupResult<SetupOutcome>
where
    S: LoggingSettings,
    B: LoggingBackend + ?Sized,
{
    LoggingSetup::new().run(settings, guard, backend)
}
