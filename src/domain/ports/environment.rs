//! Port for environment variable lookup

use std::collections::HashMap;

/// Source of environment variable values
pub trait EnvironmentSource {
    /// Value of `key`, or `None` when it is unset or not valid UTF-8
    fn var(&self, key: &str) -> Option<String>;
}

impl EnvironmentSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<T: EnvironmentSource + ?Sized> EnvironmentSource for &T {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}
