//! In-memory logger registry
//!
//! Interprets a structured logging description (`version`, `formatters`,
//! `handlers`, `loggers`, `root`) into named loggers arranged in a dotted
//! hierarchy. A logger's effective level is its own level, or that of the
//! nearest ancestor with one set, ending at the root logger.

use serde_yaml::Value;
use std::collections::BTreeMap;
use tracing::debug;

use super::config::{parse_flag, FormatterSpec, HandlerSpec, LoggerSpec, LoggingDescription};
use crate::domain::errors::ApplyError;
use crate::domain::models::{ConfigTree, LogLevel};
use crate::domain::ports::{LoggerSnapshot, LoggingBackend, ROOT_LOGGER};

/// A configured handler
#[derive(Debug, Clone, PartialEq)]
pub struct Handler {
    /// Name the handler is defined under
    pub name: String,
    /// Implementation class
    pub class: String,
    /// Minimum level emitted
    pub level: LogLevel,
    /// Formatter name
    pub formatter: Option<String>,
    /// Remaining handler options
    pub options: BTreeMap<String, Value>,
}

impl Handler {
    /// String option such as `filename` or `stream`
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }
}

/// A configured formatter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    /// Name the formatter is defined under
    pub name: String,
    /// Record format string
    pub format: Option<String>,
    /// Timestamp format string
    pub datefmt: Option<String>,
    /// Implementation class
    pub class: Option<String>,
}

impl Formatter {
    /// Whether the formatter produces JSON, judged by name or class
    pub fn is_json(&self) -> bool {
        self.name.eq_ignore_ascii_case("json")
            || self
                .class
                .as_deref()
                .is_some_and(|class| class.to_lowercase().contains("json"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LoggerEntry {
    level: LogLevel,
    handlers: Vec<String>,
    propagate: bool,
    disabled: bool,
}

impl Default for LoggerEntry {
    fn default() -> Self {
        Self {
            level: LogLevel::NotSet,
            handlers: Vec::new(),
            propagate: true,
            disabled: false,
        }
    }
}

/// Registry of loggers, handlers and formatters
#[derive(Debug, Clone)]
pub struct LoggerRegistry {
    root: LoggerEntry,
    loggers: BTreeMap<String, LoggerEntry>,
    handlers: BTreeMap<String, Handler>,
    formatters: BTreeMap<String, Formatter>,
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerRegistry {
    /// Empty registry; the root logger starts at `WARNING`
    pub fn new() -> Self {
        Self {
            root: LoggerEntry {
                level: LogLevel::Warning,
                ..LoggerEntry::default()
            },
            loggers: BTreeMap::new(),
            handlers: BTreeMap::new(),
            formatters: BTreeMap::new(),
        }
    }

    /// Handler defined under `name`
    pub fn handler(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    /// All handlers, ordered by name
    pub fn handlers(&self) -> impl Iterator<Item = &Handler> {
        self.handlers.values()
    }

    /// Formatter defined under `name`
    pub fn formatter(&self, name: &str) -> Option<&Formatter> {
        self.formatters.get(name)
    }

    /// Names of all loggers known to the registry, excluding root
    pub fn logger_names(&self) -> impl Iterator<Item = &str> {
        self.loggers.keys().map(String::as_str)
    }

    /// Own level of `name` or its nearest ancestor with one, else the root level
    pub fn effective_level(&self, name: &str) -> LogLevel {
        let mut current = Some(name);
        while let Some(candidate) = current {
            if let Some(entry) = self.loggers.get(candidate) {
                if entry.level != LogLevel::NotSet {
                    return entry.level;
                }
            }
            current = parent_name(candidate);
        }
        self.root.level
    }

    fn entry_mut(&mut self, name: &str) -> &mut LoggerEntry {
        if is_root(name) {
            return &mut self.root;
        }
        self.loggers.entry(name.to_string()).or_default()
    }

    fn apply(&mut self, staged: Staged, disable_existing: bool) {
        let configured: Vec<&String> = staged.loggers.keys().collect();
        for (name, entry) in &mut self.loggers {
            if staged.loggers.contains_key(name) {
                continue;
            }
            if configured.iter().any(|parent| is_descendant(name, parent)) {
                // children of configured loggers are reset to inherit
                *entry = LoggerEntry::default();
            } else {
                entry.disabled = disable_existing;
            }
        }

        self.formatters = staged.formatters;
        self.handlers = staged.handlers;
        for (name, update) in staged.loggers {
            let entry = self.loggers.entry(name).or_default();
            update.merge_into(entry);
            entry.disabled = false;
        }
        if let Some(update) = staged.root {
            update.merge_into(&mut self.root);
        }
    }
}

/// Logger section as written; absent keys keep the logger's current value
#[derive(Debug)]
struct LoggerUpdate {
    level: Option<LogLevel>,
    handlers: Vec<String>,
    propagate: Option<bool>,
}

impl LoggerUpdate {
    fn merge_into(self, entry: &mut LoggerEntry) {
        entry.handlers = self.handlers;
        if let Some(level) = self.level {
            entry.level = level;
        }
        if let Some(propagate) = self.propagate {
            entry.propagate = propagate;
        }
    }
}

/// Fully validated contents of a description, applied in one step
struct Staged {
    formatters: BTreeMap<String, Formatter>,
    handlers: BTreeMap<String, Handler>,
    loggers: BTreeMap<String, LoggerUpdate>,
    root: Option<LoggerUpdate>,
}

impl LoggingBackend for LoggerRegistry {
    fn configure(&mut self, config: &ConfigTree) -> Result<(), ApplyError> {
        let description: LoggingDescription =
            serde_yaml::from_value(Value::Mapping(config.as_mapping().clone())).map_err(|e| {
                ApplyError::InvalidSection {
                    section: "<root>".to_string(),
                    message: e.to_string(),
                }
            })?;

        check_version(description.version.as_ref())?;
        let disable_existing = match &description.disable_existing_loggers {
            None | Some(Value::Null) => true,
            Some(value) => parse_flag(value).ok_or_else(|| ApplyError::InvalidValue {
                target: "<root>".to_string(),
                field: "disable_existing_loggers".to_string(),
                value: render(value),
            })?,
        };

        let formatters = description
            .formatters
            .unwrap_or_default()
            .into_iter()
            .map(|(name, spec)| (name.clone(), build_formatter(name, spec)))
            .collect::<BTreeMap<_, _>>();

        let handlers = description
            .handlers
            .unwrap_or_default()
            .into_iter()
            .map(|(name, spec)| -> Result<_, ApplyError> {
                Ok((name.clone(), build_handler(name, spec, &formatters)?))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let loggers = description
            .loggers
            .unwrap_or_default()
            .into_iter()
            .map(|(name, spec)| -> Result<_, ApplyError> {
                let update = build_logger(&name, spec, &handlers)?;
                Ok((name, update))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let root = description
            .root
            .map(|spec| build_logger(ROOT_LOGGER, spec, &handlers))
            .transpose()?;

        debug!(
            formatters = formatters.len(),
            handlers = handlers.len(),
            loggers = loggers.len(),
            "applying structured logging description"
        );

        self.apply(
            Staged {
                formatters,
                handlers,
                loggers,
                root,
            },
            disable_existing,
        );
        Ok(())
    }

    fn logger(&self, name: &str) -> LoggerSnapshot {
        let entry = if is_root(name) {
            Some(&self.root)
        } else {
            self.loggers.get(name)
        };
        let Some(entry) = entry else {
            return LoggerSnapshot {
                effective_level: self.effective_level(name),
                ..LoggerSnapshot::unconfigured(name)
            };
        };
        LoggerSnapshot {
            name: name.to_string(),
            level: entry.level,
            effective_level: if is_root(name) {
                entry.level
            } else {
                self.effective_level(name)
            },
            handlers: entry.handlers.clone(),
            propagate: entry.propagate,
            disabled: entry.disabled,
        }
    }

    fn attach_handler(&mut self, logger: &str, handler: &str) -> Result<(), ApplyError> {
        if !self.handlers.contains_key(handler) {
            return Err(ApplyError::UnknownHandler {
                logger: logger.to_string(),
                handler: handler.to_string(),
            });
        }
        let entry = self.entry_mut(logger);
        if !entry.handlers.iter().any(|existing| existing == handler) {
            entry.handlers.push(handler.to_string());
        }
        Ok(())
    }

    fn set_level(&mut self, logger: &str, level: LogLevel) {
        self.entry_mut(logger).level = level;
    }

    fn set_propagate(&mut self, logger: &str, propagate: bool) {
        self.entry_mut(logger).propagate = propagate;
    }
}

fn check_version(version: Option<&Value>) -> Result<(), ApplyError> {
    let supported = match version {
        Some(Value::Number(number)) => number.as_i64() == Some(1),
        Some(Value::String(text)) => text.trim() == "1",
        _ => false,
    };
    if supported {
        Ok(())
    } else {
        Err(ApplyError::UnsupportedVersion(
            version.map_or_else(|| "<missing>".to_string(), render),
        ))
    }
}

fn build_formatter(name: String, spec: FormatterSpec) -> Formatter {
    Formatter {
        name,
        format: spec.format,
        datefmt: spec.datefmt,
        class: spec.class,
    }
}

fn build_handler(
    name: String,
    spec: HandlerSpec,
    formatters: &BTreeMap<String, Formatter>,
) -> Result<Handler, ApplyError> {
    let class = spec
        .class
        .ok_or_else(|| ApplyError::MissingHandlerClass(name.clone()))?;

    if let Some(formatter) = &spec.formatter {
        if !formatters.contains_key(formatter) {
            return Err(ApplyError::UnknownFormatter {
                handler: name,
                formatter: formatter.clone(),
            });
        }
    }

    let level = parse_level(&name, spec.level.as_ref())?.unwrap_or_default();

    Ok(Handler {
        name,
        class,
        level,
        formatter: spec.formatter,
        options: spec.options,
    })
}

fn build_logger(
    name: &str,
    spec: LoggerSpec,
    handlers: &BTreeMap<String, Handler>,
) -> Result<LoggerUpdate, ApplyError> {
    let handler_names = spec.handlers.unwrap_or_default();
    if let Some(missing) = handler_names.iter().find(|h| !handlers.contains_key(*h)) {
        return Err(ApplyError::UnknownHandler {
            logger: name.to_string(),
            handler: missing.clone(),
        });
    }

    let propagate = match &spec.propagate {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse_flag(value).ok_or_else(|| ApplyError::InvalidValue {
            target: name.to_string(),
            field: "propagate".to_string(),
            value: render(value),
        })?),
    };

    Ok(LoggerUpdate {
        level: parse_level(name, spec.level.as_ref())?,
        handlers: handler_names,
        propagate,
    })
}

/// Level named by `value`; `None` when absent or null
fn parse_level(target: &str, value: Option<&Value>) -> Result<Option<LogLevel>, ApplyError> {
    let Some(value) = value else {
        return Ok(None);
    };
    LogLevel::from_value(value).map_err(|_| ApplyError::InvalidLevel {
        target: target.to_string(),
        value: render(value),
    })
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| format!("{other:?}")),
    }
}

fn is_root(name: &str) -> bool {
    name.is_empty() || name == ROOT_LOGGER
}

fn parent_name(name: &str) -> Option<&str> {
    name.rfind('.').map(|index| &name[..index])
}

fn is_descendant(name: &str, ancestor: &str) -> bool {
    name.len() > ancestor.len()
        && name.starts_with(ancestor)
        && name.as_bytes()[ancestor.len()] == b'.'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::LogConfigLoader;

    fn tree(yaml: &str) -> ConfigTree {
        LogConfigLoader::parse(yaml).expect("valid tree")
    }

    const BASIC: &str = r"
version: 1
formatters:
  standard:
    format: '%(message)s'
  json:
    class: logcfg.formatters.JsonFormatter
handlers:
  console:
    class: logging.StreamHandler
    formatter: standard
  file:
    class: logging.FileHandler
    level: INFO
    formatter: json
    filename: /tmp/app.log
loggers:
  app:
    level: DEBUG
    handlers: [console]
  app.db:
    propagate: 'false'
    handlers: [file]
root:
  level: WARNING
  handlers: [console]
";

    #[test]
    fn test_configure_builds_loggers() {
        let mut registry = LoggerRegistry::new();

        registry.configure(&tree(BASIC)).unwrap();

        let app = registry.logger("app");
        assert_eq!(app.level, LogLevel::Debug);
        assert_eq!(app.handlers, vec!["console"]);
        assert!(app.propagate);

        let db = registry.logger("app.db");
        assert_eq!(db.level, LogLevel::NotSet);
        assert_eq!(db.effective_level, LogLevel::Debug);
        assert!(!db.propagate);

        let root = registry.logger(ROOT_LOGGER);
        assert_eq!(root.level, LogLevel::Warning);
        assert_eq!(root.handlers, vec!["console"]);

        let file = registry.handler("file").unwrap();
        assert_eq!(file.level, LogLevel::Info);
        assert_eq!(file.option_str("filename"), Some("/tmp/app.log"));
        assert!(registry.formatter("json").unwrap().is_json());
        assert!(!registry.formatter("standard").unwrap().is_json());
    }

    #[test]
    fn test_unknown_logger_inherits_effective_level() {
        let mut registry = LoggerRegistry::new();
        registry.configure(&tree(BASIC)).unwrap();

        let snapshot = registry.logger("app.db.pool");

        assert_eq!(snapshot.level, LogLevel::NotSet);
        assert_eq!(snapshot.effective_level, LogLevel::Debug);
        assert!(snapshot.handlers.is_empty());
        assert_eq!(registry.logger("other").effective_level, LogLevel::Warning);
    }

    #[test]
    fn test_version_must_be_one() {
        let mut registry = LoggerRegistry::new();

        assert!(matches!(
            registry.configure(&tree("version: 2\n")),
            Err(ApplyError::UnsupportedVersion(v)) if v == "2"
        ));
        assert!(matches!(
            registry.configure(&tree("root: {}\n")),
            Err(ApplyError::UnsupportedVersion(_))
        ));
        assert!(registry.configure(&tree("version: '1'\n")).is_ok());
    }

    #[test]
    fn test_rejects_unknown_references() {
        let mut registry = LoggerRegistry::new();

        let err = registry
            .configure(&tree("version: 1\nloggers:\n  app:\n    handlers: [missing]\n"))
            .unwrap_err();
        assert!(matches!(err, ApplyError::UnknownHandler { handler, .. } if handler == "missing"));

        let err = registry
            .configure(&tree(
                "version: 1\nhandlers:\n  h:\n    class: logging.StreamHandler\n    formatter: nope\n",
            ))
            .unwrap_err();
        assert!(matches!(err, ApplyError::UnknownFormatter { formatter, .. } if formatter == "nope"));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut registry = LoggerRegistry::new();

        assert!(matches!(
            registry.configure(&tree("version: 1\nloggers:\n  app:\n    level: LOUD\n")),
            Err(ApplyError::InvalidLevel { target, value }) if target == "app" && value == "LOUD"
        ));
        assert!(matches!(
            registry.configure(&tree("version: 1\nloggers:\n  app:\n    propagate: sometimes\n")),
            Err(ApplyError::InvalidValue { field, .. }) if field == "propagate"
        ));
        assert!(matches!(
            registry.configure(&tree("version: 1\nhandlers:\n  h:\n    level: INFO\n")),
            Err(ApplyError::MissingHandlerClass(name)) if name == "h"
        ));
    }

    #[test]
    fn test_failed_configure_leaves_registry_untouched() {
        let mut registry = LoggerRegistry::new();
        registry.configure(&tree(BASIC)).unwrap();

        let result = registry.configure(&tree(
            "version: 1\nloggers:\n  app:\n    level: INFO\n    handlers: [missing]\n",
        ));

        assert!(result.is_err());
        assert_eq!(registry.logger("app").level, LogLevel::Debug);
        assert!(registry.handler("console").is_some());
    }

    #[test]
    fn test_null_level_is_not_set() {
        let mut registry = LoggerRegistry::new();

        registry
            .configure(&tree("version: 1\nloggers:\n  app:\n    level: null\n"))
            .unwrap();

        assert_eq!(registry.logger("app").level, LogLevel::NotSet);
    }

    #[test]
    fn test_disable_existing_loggers() {
        let mut registry = LoggerRegistry::new();
        registry.set_level("legacy", LogLevel::Info);
        registry.set_level("app.child", LogLevel::Error);

        registry
            .configure(&tree("version: 1\nloggers:\n  app:\n    level: DEBUG\n"))
            .unwrap();

        assert!(registry.logger("legacy").disabled);
        let child = registry.logger("app.child");
        assert!(!child.disabled);
        assert_eq!(child.level, LogLevel::NotSet, "children of configured loggers reset");
    }

    #[test]
    fn test_keep_existing_loggers_when_disabled_flag_false() {
        let mut registry = LoggerRegistry::new();
        registry.set_level("legacy", LogLevel::Info);

        registry
            .configure(&tree("version: 1\ndisable_existing_loggers: 'False'\n"))
            .unwrap();

        let legacy = registry.logger("legacy");
        assert!(!legacy.disabled);
        assert_eq!(legacy.level, LogLevel::Info);
    }

    #[test]
    fn test_root_without_level_keeps_current_level() {
        let mut registry = LoggerRegistry::new();

        registry
            .configure(&tree(
                "version: 1\nhandlers:\n  c:\n    class: logging.StreamHandler\nroot:\n  handlers: [c]\n",
            ))
            .unwrap();

        let root = registry.logger(ROOT_LOGGER);
        assert_eq!(root.level, LogLevel::Warning);
        assert_eq!(root.handlers, vec!["c"]);
        assert_eq!(registry.logger("anything").effective_level, LogLevel::Warning);
    }

    #[test]
    fn test_reconfigure_merges_absent_keys() {
        let mut registry = LoggerRegistry::new();
        registry.configure(&tree(BASIC)).unwrap();

        registry
            .configure(&tree(
                "version: 1\nhandlers:\n  file:\n    class: logging.FileHandler\n    filename: /tmp/app.log\nloggers:\n  app.db:\n    handlers: [file]\n",
            ))
            .unwrap();

        let db = registry.logger("app.db");
        assert!(!db.propagate, "propagate kept from the earlier description");
        assert_eq!(db.handlers, vec!["file"]);
        assert_eq!(registry.logger("app").level, LogLevel::Debug);
        assert!(registry.logger("app").disabled);
    }

    #[test]
    fn test_reconfigured_logger_is_enabled_again() {
        let mut registry = LoggerRegistry::new();
        registry.set_level("legacy", LogLevel::Info);
        registry.configure(&tree("version: 1\n")).unwrap();
        assert!(registry.logger("legacy").disabled);

        registry
            .configure(&tree("version: 1\nloggers:\n  legacy: {}\n"))
            .unwrap();

        let legacy = registry.logger("legacy");
        assert!(!legacy.disabled);
        assert_eq!(legacy.level, LogLevel::Info);
    }

    #[test]
    fn test_attach_handler_deduplicates_and_validates() {
        let mut registry = LoggerRegistry::new();
        registry.configure(&tree(BASIC)).unwrap();

        registry.attach_handler("vendor", "console").unwrap();
        registry.attach_handler("vendor", "console").unwrap();

        assert_eq!(registry.logger("vendor").handlers, vec!["console"]);
        assert!(registry.attach_handler("vendor", "missing").is_err());
    }

    #[test]
    fn test_hierarchy_helpers() {
        assert_eq!(parent_name("a.b.c"), Some("a.b"));
        assert_eq!(parent_name("a"), None);
        assert!(is_descendant("app.db", "app"));
        assert!(!is_descendant("application", "app"));
        assert!(!is_descendant("app", "app"));
    }
}
