// Integration tests for loading and resolving logging configuration files
// against the process environment and application settings.

use logcfg::{
    ConfigResolver, FlatKey, LogConfigError, LogConfigLoader, LoggingSettings, Settings,
};
use serde_yaml::Value;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

fn config_file(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{yaml}").unwrap();
    file.flush().unwrap();
    file
}

/// Settings with a custom prefix and a fixed set of named values
struct PrefixedSettings {
    prefix: &'static str,
    values: Vec<(&'static str, Value)>,
}

impl LoggingSettings for PrefixedSettings {
    fn env_prefix(&self) -> &str {
        self.prefix
    }

    fn settings_path(&self) -> &Path {
        Path::new("logging.yml")
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.clone())
    }

    fn extra_loggers(&self) -> Vec<String> {
        Vec::new()
    }
}

#[test]
fn test_environment_override_from_process_env() {
    let file = config_file("loggers:\n  root:\n    level: INFO\n    propagate: true\n");
    let settings = PrefixedSettings {
        prefix: "LOGCFG_IT_A_",
        values: vec![],
    };

    temp_env::with_vars(
        [
            ("LOGCFG_IT_A_LOGGERS_ROOT_LEVEL", Some("DEBUG")),
            ("LOGCFG_IT_A_LOGGERS_ROOT_PROPAGATE", Some("0")),
        ],
        || {
            let resolved = ConfigResolver::new()
                .resolve(file.path(), &settings)
                .expect("configuration should resolve");
            let flat = resolved.flatten();

            assert_eq!(
                flat.get(&FlatKey::new(["loggers", "root", "level"])),
                Some(&Value::from("DEBUG"))
            );
            assert_eq!(
                flat.get(&FlatKey::new(["loggers", "root", "propagate"])),
                Some(&Value::from("0")),
                "overrides replace non-string leaves with strings"
            );
        },
    );
}

#[test]
fn test_settings_references_resolve_against_settings() {
    let file = config_file(
        "loggers:\n  app:\n    level: '{{log_level}}'\n  other:\n    level: '{{missing_attr}}'\nformat: '{{not closed'\nname: plain text\n",
    );
    let settings = PrefixedSettings {
        prefix: "LOGCFG_IT_B_",
        values: vec![("log_level", Value::from("WARNING"))],
    };

    let resolved = ConfigResolver::new().resolve(file.path(), &settings).unwrap();
    let flat = resolved.flatten();

    assert_eq!(
        flat.get(&FlatKey::new(["loggers", "app", "level"])),
        Some(&Value::from("WARNING"))
    );
    assert_eq!(
        flat.get(&FlatKey::new(["loggers", "other", "level"])),
        Some(&Value::Null)
    );
    assert_eq!(resolved.get("format"), Some(&Value::from("{{not closed")));
    assert_eq!(resolved.get("name"), Some(&Value::from("plain text")));
}

#[test]
fn test_resolution_preserves_tree_shape() {
    let yaml = "version: 1\nhandlers:\n  console:\n    class: logging.StreamHandler\n    level: 0\nloggers:\n  app:\n    handlers: [console]\n";
    let file = config_file(yaml);
    let settings = PrefixedSettings {
        prefix: "LOGCFG_IT_C_",
        values: vec![],
    };

    let resolved = ConfigResolver::new().resolve(file.path(), &settings).unwrap();

    assert_eq!(resolved, LogConfigLoader::parse(yaml).unwrap());
}

#[test]
fn test_missing_source_and_default_is_not_found() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        settings_path: dir.path().join("logging.yml"),
        ..Default::default()
    };
    let loader = LogConfigLoader::new().with_default_path(dir.path().join("default.yml"));

    let err = loader.select_source(&settings).unwrap_err();

    assert!(matches!(err, LogConfigError::NotFound { .. }));
    assert!(err.to_string().contains("default.yml"));
}

#[test]
fn test_resolving_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();

    let err = ConfigResolver::new()
        .resolve(&dir.path().join("gone.yml"), &Settings::default())
        .unwrap_err();

    assert!(matches!(err, LogConfigError::NotFound { .. }));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let file = config_file("loggers: {app: [unclosed\n");

    let err = ConfigResolver::new()
        .resolve(file.path(), &Settings::default())
        .unwrap_err();

    assert!(matches!(err, LogConfigError::Parse { .. }));
}
