// Integration test for installing the tracing subscriber.
// Installs the global subscriber, so everything lives in a single test.

use logcfg::{
    ApplyError, ConfigResolver, LogConfigLoader, LoggingBackend, Settings, SetupGuard,
    SetupOutcome, TracingBackend,
};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_tracing_backend_routes_events_to_file_handlers() {
    let dir = TempDir::new().unwrap();
    let app_log = dir.path().join("app.log");
    let vendor_log = dir.path().join("vendor.log");
    let yaml = format!(
        r"
version: 1
formatters:
  json:
    class: logcfg.formatters.JsonFormatter
handlers:
  app_file:
    class: logging.FileHandler
    filename: '{}'
  vendor_file:
    class: logging.FileHandler
    formatter: json
    filename: '{}'
loggers:
  app:
    level: '{{{{level}}}}'
    handlers: [app_file]
    propagate: false
  logcfg.extra:
    level: DEBUG
    handlers: [vendor_file]
    propagate: false
root:
  level: ERROR
",
        app_log.display(),
        vendor_log.display()
    );
    let settings = Settings {
        extra_loggers: "vendor.lib".to_string(),
        ..Default::default()
    };
    let config = ConfigResolver::with_environment(HashMap::<String, String>::new())
        .resolve_tree(&LogConfigLoader::parse(&yaml).unwrap(), &settings);
    let guard = SetupGuard::new();
    let mut backend = TracingBackend::new();

    let outcome = guard.apply_once(config, &settings, &mut backend).unwrap();
    assert_eq!(outcome, SetupOutcome::Applied);
    assert!(backend.skipped_handlers().is_empty());

    tracing::info!(target: "app::worker", "worker started");
    tracing::debug!(target: "app::worker", "hidden by INFO level");
    tracing::debug!(target: "vendor::lib", answer = 42, "vendor debug event");
    tracing::info!(target: "unrelated", "routed nowhere");

    // A second subscriber cannot be installed in the same process
    let mut second = TracingBackend::new();
    second
        .configure(&LogConfigLoader::parse("version: 1\n").unwrap())
        .unwrap();
    assert!(matches!(
        second.activate(),
        Err(ApplyError::SubscriberInstall(_))
    ));

    // Dropping the backend flushes the non-blocking writers
    drop(backend);

    let app = fs::read_to_string(&app_log).expect("app log should exist");
    assert!(app.contains("worker started"));
    assert!(!app.contains("hidden by INFO level"));
    assert!(!app.contains("vendor debug event"));
    assert!(!app.contains("routed nowhere"));

    let vendor = fs::read_to_string(&vendor_log).expect("vendor log should exist");
    assert!(vendor.contains("vendor debug event"));
    assert!(vendor.contains("\"answer\":42"));
}
