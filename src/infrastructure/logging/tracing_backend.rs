//! `tracing` subscriber backend

use std::fmt;
use std::io;
use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use super::config::{LogFormat, RotationPolicy};
use super::registry::{Handler, LoggerRegistry};
use crate::domain::errors::ApplyError;
use crate::domain::models::{ConfigTree, LogLevel};
use crate::domain::ports::{LoggerSnapshot, LoggingBackend, ROOT_LOGGER};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Logging backend that installs a global `tracing` subscriber
///
/// Configuration and per-logger mutation go to an in-memory
/// [`LoggerRegistry`]. On activation every handler reachable from some
/// logger becomes a `fmt` layer, filtered by target so that only events
/// from loggers routed to that handler get through. Dotted logger names
/// map to `::` separated targets.
#[derive(Default)]
pub struct TracingBackend {
    registry: LoggerRegistry,
    guards: Vec<WorkerGuard>,
    skipped: Vec<String>,
}

impl fmt::Debug for TracingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingBackend")
            .field("registry", &self.registry)
            .field("guards", &self.guards.len())
            .field("skipped", &self.skipped)
            .finish()
    }
}

impl TracingBackend {
    /// Backend with an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the configured loggers
    pub fn registry(&self) -> &LoggerRegistry {
        &self.registry
    }

    /// Handlers whose class has no `tracing` equivalent
    pub fn skipped_handlers(&self) -> &[String] {
        &self.skipped
    }

    /// Build one filtered layer per routed handler
    ///
    /// File handlers open their file here; the writer guards are kept for
    /// the lifetime of the backend.
    pub fn build_layers(&mut self) -> Result<Vec<BoxedLayer>, ApplyError> {
        let handlers: Vec<Handler> = self.registry.handlers().cloned().collect();
        let mut layers: Vec<BoxedLayer> = Vec::new();
        self.skipped.clear();

        for handler in handlers {
            let Some(targets) = handler_targets(&self.registry, &handler) else {
                continue;
            };
            let Some(writer) = self.make_writer(&handler)? else {
                self.skipped.push(handler.name.clone());
                continue;
            };

            let format = self.format_of(&handler);
            let ansi = is_stream(&handler.class);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true);

            let layer: BoxedLayer = match format {
                LogFormat::Json => layer
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_filter(targets)
                    .boxed(),
                LogFormat::Text => layer.with_filter(targets).boxed(),
            };
            layers.push(layer);
        }

        Ok(layers)
    }

    fn format_of(&self, handler: &Handler) -> LogFormat {
        let is_json = handler
            .formatter
            .as_deref()
            .and_then(|name| self.registry.formatter(name))
            .is_some_and(super::registry::Formatter::is_json);
        if is_json {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }

    fn make_writer(&mut self, handler: &Handler) -> Result<Option<BoxMakeWriter>, ApplyError> {
        if is_file(&handler.class) {
            let filename = handler
                .option_str("filename")
                .ok_or_else(|| ApplyError::InvalidValue {
                    target: handler.name.clone(),
                    field: "filename".to_string(),
                    value: "<missing>".to_string(),
                })?;
            let rotation = RotationPolicy::from_when(handler.option_str("when"));
            let appender = file_appender(Path::new(filename), rotation).map_err(|message| {
                ApplyError::HandlerInit {
                    handler: handler.name.clone(),
                    message,
                }
            })?;
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            self.guards.push(guard);
            return Ok(Some(BoxMakeWriter::new(non_blocking)));
        }

        if is_stream(&handler.class) {
            let writer = if handler.option_str("stream") == Some("ext://sys.stdout") {
                BoxMakeWriter::new(io::stdout)
            } else {
                BoxMakeWriter::new(io::stderr)
            };
            return Ok(Some(writer));
        }

        Ok(None)
    }
}

impl LoggingBackend for TracingBackend {
    fn configure(&mut self, config: &ConfigTree) -> Result<(), ApplyError> {
        self.registry.configure(config)
    }

    fn logger(&self, name: &str) -> LoggerSnapshot {
        self.registry.logger(name)
    }

    fn attach_handler(&mut self, logger: &str, handler: &str) -> Result<(), ApplyError> {
        self.registry.attach_handler(logger, handler)
    }

    fn set_level(&mut self, logger: &str, level: LogLevel) {
        self.registry.set_level(logger, level);
    }

    fn set_propagate(&mut self, logger: &str, propagate: bool) {
        self.registry.set_propagate(logger, propagate);
    }

    fn activate(&mut self) -> Result<(), ApplyError> {
        let layers = self.build_layers()?;
        let count = layers.len();

        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(|e| ApplyError::SubscriberInstall(e.to_string()))?;

        for name in &self.skipped {
            warn!(handler = %name, "handler class has no tracing equivalent, skipped");
        }
        info!(layers = count, "logging subsystem configured");
        Ok(())
    }
}

fn file_appender(path: &Path, rotation: RotationPolicy) -> Result<RollingFileAppender, String> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let prefix = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| format!("{} has no file name", path.display()))?;
    let rotation = match rotation {
        RotationPolicy::Daily => Rotation::DAILY,
        RotationPolicy::Hourly => Rotation::HOURLY,
        RotationPolicy::Never => Rotation::NEVER,
    };

    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(prefix)
        .build(directory)
        .map_err(|e| e.to_string())
}

fn is_file(class: &str) -> bool {
    class.ends_with("FileHandler")
}

fn is_stream(class: &str) -> bool {
    class.ends_with("StreamHandler") || class.ends_with("ConsoleHandler")
}

fn target_of(logger: &str) -> String {
    logger.replace('.', "::")
}

/// Target filter for `handler`, or `None` when no logger routes to it
///
/// Each known logger gets an explicit entry: off when it is disabled or its
/// events never reach the handler, otherwise the stricter of its effective
/// level and the handler level. Targets not listed fall back to the root
/// logger's routing.
fn handler_targets(registry: &LoggerRegistry, handler: &Handler) -> Option<Targets> {
    let handler_filter = handler.level.to_level_filter();
    let root = registry.logger(ROOT_LOGGER);
    let via_root = root.handlers.contains(&handler.name);

    let mut targets = Targets::new();
    let mut routed = via_root;
    if via_root {
        targets = targets.with_default(root.effective_level.to_level_filter().min(handler_filter));
    }

    for name in registry.logger_names() {
        let logger = registry.logger(name);
        let filter = if !logger.disabled && reaches(registry, name, &handler.name) {
            routed = true;
            logger.effective_level.to_level_filter().min(handler_filter)
        } else {
            LevelFilter::OFF
        };
        targets = targets.with_target(target_of(name), filter);
    }

    routed.then_some(targets)
}

/// Whether events logged on `logger` propagate to `handler`
fn reaches(registry: &LoggerRegistry, logger: &str, handler: &str) -> bool {
    let mut current = Some(logger);
    while let Some(name) = current {
        let snapshot = registry.logger(name);
        if snapshot.handlers.iter().any(|h| h == handler) {
            return true;
        }
        if !snapshot.propagate {
            return false;
        }
        current = name.rfind('.').map(|index| &name[..index]);
    }
    registry.logger(ROOT_LOGGER).handlers.iter().any(|h| h == handler)
}
