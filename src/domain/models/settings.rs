//! Application settings read by logging setup

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::ports::LoggingSettings;

/// Prefix shared by settings variables and logging configuration overrides
pub const ENV_PREFIX: &str = "LOGCFG_LOGGING_";

/// Application settings consumed by logging setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    /// Default level for application loggers, referenced as `{{level}}`
    #[serde(default = "default_level")]
    pub level: String,

    /// Level for the crate's own internal loggers
    #[serde(default = "default_internal_level")]
    pub internal_level: String,

    /// Path to the logging configuration file
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,

    /// Comma separated names of loggers that copy the `extra` template logger
    #[serde(default)]
    pub extra_loggers: String,

    /// Whether console output may use colors
    #[serde(default = "default_true")]
    pub colors: bool,

    /// Additional named settings available as `{{name}}` references
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_level() -> String {
    "INFO".to_string()
}

fn default_internal_level() -> String {
    "ERROR".to_string()
}

fn default_settings_path() -> PathBuf {
    PathBuf::from(".logcfg/logging.yml")
}

const fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: default_level(),
            internal_level: default_internal_level(),
            settings_path: default_settings_path(),
            extra_loggers: String::new(),
            colors: default_true(),
            extra: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Names listed in `extra_loggers`, trimmed, with blanks dropped
    pub fn get_extra_loggers(&self) -> Vec<String> {
        self.extra_loggers
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl LoggingSettings for Settings {
    fn env_prefix(&self) -> &str {
        ENV_PREFIX
    }

    fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        match name {
            "level" => Some(Value::String(self.level.clone())),
            "internal_level" => Some(Value::String(self.internal_level.clone())),
            "settings_path" => Some(Value::String(
                self.settings_path.to_string_lossy().into_owned(),
            )),
            "extra_loggers" => Some(Value::String(self.extra_loggers.clone())),
            "colors" => Some(Value::Bool(self.colors)),
            other => self.extra.get(other).cloned(),
        }
    }

    fn extra_loggers(&self) -> Vec<String> {
        self.get_extra_loggers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.level, "INFO");
        assert_eq!(settings.settings_path, PathBuf::from(".logcfg/logging.yml"));
        assert!(settings.get_extra_loggers().is_empty());
        assert_eq!(settings.env_prefix(), "LOGCFG_LOGGING_");
    }

    #[test]
    fn test_extra_loggers_are_split_and_trimmed() {
        let settings = Settings {
            extra_loggers: " vendor.lib, ,sqlx ,".to_string(),
            ..Default::default()
        };

        assert_eq!(settings.get_extra_loggers(), vec!["vendor.lib", "sqlx"]);
    }

    #[test]
    fn test_lookup_known_and_extra_attributes() {
        let mut settings = Settings {
            level: "WARNING".to_string(),
            ..Default::default()
        };
        settings
            .extra
            .insert("log_dir".to_string(), Value::from("/var/log/app"));

        assert_eq!(settings.lookup("level"), Some(Value::from("WARNING")));
        assert_eq!(settings.lookup("colors"), Some(Value::Bool(true)));
        assert_eq!(settings.lookup("log_dir"), Some(Value::from("/var/log/app")));
        assert_eq!(settings.lookup("missing_attr"), None);
    }

    #[test]
    fn test_yaml_parsing_collects_extra_attributes() {
        let yaml = r"
level: DEBUG
extra_loggers: vendor.lib
log_dir: /tmp/logs
";

        let settings: Settings = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(settings.level, "DEBUG");
        assert_eq!(settings.internal_level, "ERROR");
        assert_eq!(settings.get_extra_loggers(), vec!["vendor.lib"]);
        assert_eq!(settings.extra.get("log_dir"), Some(&Value::from("/tmp/logs")));
    }
}
