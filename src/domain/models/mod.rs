//! Configuration trees, log levels and application settings

pub mod config_tree;
pub mod level;
pub mod settings;

pub use config_tree::{
    flatten, unflatten, ConfigTree, FlatConfig, FlatKey, ResolvedConfig, TreeError,
};
pub use level::{LogLevel, ParseLevelError};
pub use settings::{Settings, ENV_PREFIX};
