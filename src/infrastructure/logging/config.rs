//! Schema of a structured logging description

use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Structured logging description as found in a resolved configuration
///
/// Fields stay loosely typed where environment overrides may have replaced
/// a number or boolean with a string; the registry interprets them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingDescription {
    /// Schema version, only `1` is accepted
    pub version: Option<Value>,
    /// Disable loggers not named in this description
    pub disable_existing_loggers: Option<Value>,
    /// Formatters by name
    pub formatters: Option<BTreeMap<String, FormatterSpec>>,
    /// Handlers by name
    pub handlers: Option<BTreeMap<String, HandlerSpec>>,
    /// Loggers by dotted name
    pub loggers: Option<BTreeMap<String, LoggerSpec>>,
    /// Root logger
    pub root: Option<LoggerSpec>,
}

/// Formatter entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormatterSpec {
    /// Record format string
    pub format: Option<String>,
    /// Timestamp format string
    pub datefmt: Option<String>,
    /// Formatter implementation
    pub class: Option<String>,
}

/// Handler entry; anything besides the well-known keys lands in `options`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandlerSpec {
    /// Handler implementation, such as `logging.StreamHandler`
    #[serde(default)]
    pub class: Option<String>,

    /// Minimum level the handler emits
    #[serde(default)]
    pub level: Option<Value>,

    /// Name of the formatter to use
    #[serde(default)]
    pub formatter: Option<String>,

    /// Class specific options such as `filename` or `stream`
    #[serde(flatten)]
    pub options: BTreeMap<String, Value>,
}

/// Logger entry (also used for `root`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggerSpec {
    /// Level set on the logger
    pub level: Option<Value>,
    /// Handler names
    pub handlers: Option<Vec<String>>,
    /// Whether records also reach ancestor handlers
    pub propagate: Option<Value>,
}

/// Output format of a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Human readable lines
    Text,
}

/// File rotation for file handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationPolicy {
    /// Rotate at midnight
    Daily,
    /// Rotate every hour
    Hourly,
    /// Single file
    #[default]
    Never,
}

impl RotationPolicy {
    /// Rotation for a handler's `when` option (`D`/`midnight`, `H`)
    pub fn from_when(when: Option<&str>) -> Self {
        match when.map(str::to_uppercase).as_deref() {
            Some("D" | "MIDNIGHT") => Self::Daily,
            Some("H") => Self::Hourly,
            _ => Self::Never,
        }
    }
}

/// Interpret a flag value, accepting booleans and common string spellings
pub fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_i64().map(|n| n != 0),
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
