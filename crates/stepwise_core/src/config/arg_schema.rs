//! Flag-declaration builder assembled during the argument-schema phase.

use super::{ConfigError, ConfigResult, RunConfig};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static FLAG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").expect("valid flag name regex"));

/// One declared boolean flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    /// Flag name without the leading `--`.
    pub name: String,
    /// One-line help text.
    pub help: String,
    /// Value used when the flag is absent from the command line.
    pub default: bool,
}

/// Mutable flag schema the host passes to extensions at startup.
///
/// Extensions contribute flags during the `ArgumentSchema` phase; the host
/// then resolves command-line tokens against the declared set.
#[derive(Debug, Default)]
pub struct ArgSchema {
    flags: BTreeMap<String, FlagSpec>,
}

impl ArgSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares one boolean flag with default `false`.
    ///
    /// # Errors
    /// - `ConfigError::InvalidFlagName` when `name` does not match
    ///   `[a-z][a-z0-9]*(-[a-z0-9]+)*`.
    /// - `ConfigError::ConfigurationConflict` when the name is already
    ///   taken. The host treats this as fatal and refuses to start.
    pub fn register_flag(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
    ) -> ConfigResult<()> {
        let name = name.into();
        let normalized = name.trim();
        if !FLAG_NAME_RE.is_match(normalized) {
            return Err(ConfigError::InvalidFlagName(name));
        }
        if self.flags.contains_key(normalized) {
            return Err(ConfigError::ConfigurationConflict(normalized.to_string()));
        }

        self.flags.insert(
            normalized.to_string(),
            FlagSpec {
                name: normalized.to_string(),
                help: help.into(),
                default: false,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flags.contains_key(name.trim())
    }

    /// Returns one flag declaration by name.
    pub fn get(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.get(name.trim())
    }

    /// Returns declared flags in sorted name order.
    pub fn flags(&self) -> impl Iterator<Item = &FlagSpec> {
        self.flags.values()
    }

    /// Resolves command-line tokens against the declared flags.
    ///
    /// Every declared flag appears in the result, absent flags at their
    /// default value. Tokens must be of the `--name` form.
    ///
    /// # Errors
    /// - `ConfigError::UnknownArgument` for a token that is not a declared
    ///   flag (or not a `--` token at all).
    pub fn parse<T: AsRef<str>>(&self, tokens: &[T]) -> ConfigResult<BTreeMap<String, bool>> {
        let mut values: BTreeMap<String, bool> = self
            .flags
            .values()
            .map(|flag| (flag.name.clone(), flag.default))
            .collect();

        for token in tokens {
            let raw = token.as_ref().trim();
            let name = match raw.strip_prefix("--") {
                Some(name) if self.flags.contains_key(name) => name,
                _ => return Err(ConfigError::UnknownArgument(raw.to_string())),
            };
            values.insert(name.to_string(), true);
        }
        Ok(values)
    }

    /// Parses tokens and writes every resolved flag into `config`.
    ///
    /// # Errors
    /// - Parse errors as for [`ArgSchema::parse`].
    /// - `ConfigError::ConfigurationFrozen` when `config` is already locked.
    pub fn parse_into<T: AsRef<str>>(
        &self,
        tokens: &[T],
        config: &mut RunConfig,
    ) -> ConfigResult<()> {
        for (name, value) in self.parse(tokens)? {
            config.set_bool(name, value)?;
        }
        Ok(())
    }
}
