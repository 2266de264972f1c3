//! Argument schema and run configuration contracts.
//!
//! # Responsibility
//! - Define the flag-declaration surface extensions contribute to.
//! - Own the mutable-then-locked run configuration for one invocation.
//!
//! # Invariants
//! - Flag registration conflicts are surfaced at startup and are fatal.
//! - After `RunConfig::lock()` every mutation fails with
//!   `ConfigError::ConfigurationFrozen`.
//! - Reads never fail: an absent or mistyped key degrades to its default.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod arg_schema;
pub mod run_config;

pub use arg_schema::{ArgSchema, FlagSpec};
pub use run_config::{ConfigValue, RunConfig};

/// Configuration key carrying the dev-mode flag value.
pub const KEY_DEV: &str = "dev";
/// Configuration key selecting the host's output reporter.
pub const KEY_REPORTER: &str = "reporter";
/// Configuration key enabling developer diagnostics.
pub const KEY_DIAGNOSTICS: &str = "diagnostics";

/// Reporter identifier the host selects by default.
///
/// Reporter identifiers are owned by the host and opaque to this core;
/// only these two are named here.
pub const REPORTER_DEFAULT: &str = "rich";
/// Low-verbosity reporter identifier forced by dev mode.
pub const REPORTER_SILENT: &str = "silent";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration-surface errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Flag name does not match the accepted identifier format.
    InvalidFlagName(String),
    /// Flag name is already taken on this schema.
    ConfigurationConflict(String),
    /// Command-line token does not resolve to a declared flag.
    UnknownArgument(String),
    /// Mutation attempted after the configuration was locked.
    ConfigurationFrozen(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFlagName(value) => write!(f, "flag name is invalid: {value}"),
            Self::ConfigurationConflict(value) => {
                write!(f, "flag name already registered: {value}")
            }
            Self::UnknownArgument(value) => write!(f, "unknown argument: {value}"),
            Self::ConfigurationFrozen(key) => {
                write!(f, "configuration is locked; cannot set key: {key}")
            }
        }
    }
}

impl Error for ConfigError {}
