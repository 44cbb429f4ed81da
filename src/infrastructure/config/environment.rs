//! Process environment adapter

use tracing::debug;

use crate::domain::ports::EnvironmentSource;

/// Reads variables from the current process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl EnvironmentSource for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                debug!(key, "ignoring environment variable that is not valid UTF-8");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_process_environment() {
        temp_env::with_vars(
            [
                ("LOGCFG_TEST_PROCESS_ENV_SET", Some("value")),
                ("LOGCFG_TEST_PROCESS_ENV_UNSET", None),
            ],
            || {
                let env = ProcessEnvironment;
                assert_eq!(env.var("LOGCFG_TEST_PROCESS_ENV_SET").as_deref(), Some("value"));
                assert_eq!(env.var("LOGCFG_TEST_PROCESS_ENV_UNSET"), None);
            },
        );
    }
}
