//! Run configuration with an explicit mutable-then-locked window.

use super::{ConfigError, ConfigResult};
use std::collections::BTreeMap;

/// Parsed option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    Text(String),
}

/// Resolved options governing one pipeline invocation.
///
/// Created fresh per run, mutated during the narrow window between
/// argument parsing and `lock()`, then immutable for the rest of the run.
#[derive(Debug, Default)]
pub struct RunConfig {
    options: BTreeMap<String, ConfigValue>,
    locked: bool,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one boolean option.
    ///
    /// # Errors
    /// - `ConfigError::ConfigurationFrozen` after `lock()`.
    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) -> ConfigResult<()> {
        self.set(key, ConfigValue::Bool(value))
    }

    /// Sets one text option.
    ///
    /// # Errors
    /// - `ConfigError::ConfigurationFrozen` after `lock()`.
    pub fn set_text(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> ConfigResult<()> {
        self.set(key, ConfigValue::Text(value.into()))
    }

    /// Sets one option, overwriting any previous value for the key.
    ///
    /// # Errors
    /// - `ConfigError::ConfigurationFrozen` after `lock()`.
    pub fn set(&mut self, key: impl Into<String>, value: ConfigValue) -> ConfigResult<()> {
        let key = key.into();
        if self.locked {
            return Err(ConfigError::ConfigurationFrozen(key));
        }
        self.options.insert(key, value);
        Ok(())
    }

    /// Freezes the configuration for the remainder of the run.
    ///
    /// Locking is idempotent; there is no unlock.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.options.get(key)
    }

    /// Reads one boolean option, degrading to `false` when the key is
    /// absent or holds a non-boolean value.
    ///
    /// The defensive default keeps extensions inert under host/version
    /// skew instead of surfacing a read fault.
    pub fn bool_or_default(&self, key: &str) -> bool {
        match self.options.get(key) {
            Some(ConfigValue::Bool(value)) => *value,
            _ => false,
        }
    }

    /// Reads one text option; `None` when absent or non-text.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.options.get(key) {
            Some(ConfigValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns option keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigValue, RunConfig};
    use crate::config::ConfigError;

    #[test]
    fn sets_and_reads_options_before_lock() {
        let mut config = RunConfig::new();
        config.set_bool("dev", true).expect("set dev");
        config.set_text("reporter", "rich").expect("set reporter");

        assert!(config.bool_or_default("dev"));
        assert_eq!(config.text("reporter"), Some("rich"));
        assert_eq!(config.get("dev"), Some(&ConfigValue::Bool(true)));
    }

    #[test]
    fn bool_or_default_degrades_for_absent_or_mistyped_keys() {
        let mut config = RunConfig::new();
        config.set_text("dev", "yes").expect("set text dev");

        assert!(!config.bool_or_default("dev"));
        assert!(!config.bool_or_default("missing"));
    }

    #[test]
    fn text_returns_none_for_absent_or_mistyped_keys() {
        let mut config = RunConfig::new();
        config.set_bool("reporter", true).expect("set bool reporter");

        assert_eq!(config.text("reporter"), None);
        assert_eq!(config.text("missing"), None);
    }

    #[test]
    fn rejects_mutation_after_lock() {
        let mut config = RunConfig::new();
        config.set_bool("dev", true).expect("set before lock");
        config.lock();
        assert!(config.is_locked());

        let err = config
            .set_bool("dev", false)
            .expect_err("locked config must reject writes");
        assert_eq!(err, ConfigError::ConfigurationFrozen("dev".to_string()));

        let err = config
            .set_text("reporter", "silent")
            .expect_err("locked config must reject writes");
        assert_eq!(err, ConfigError::ConfigurationFrozen("reporter".to_string()));

        assert!(config.bool_or_default("dev"), "reads still work after lock");
    }

    #[test]
    fn lock_is_idempotent() {
        let mut config = RunConfig::new();
        config.lock();
        config.lock();
        assert!(config.is_locked());
    }

    #[test]
    fn set_overwrites_previous_value() {
        let mut config = RunConfig::new();
        config.set_text("reporter", "rich").expect("first write");
        config.set_text("reporter", "silent").expect("second write");
        assert_eq!(config.text("reporter"), Some("silent"));
    }
}
