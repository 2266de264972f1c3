//! Extension contract and registry wiring.
//!
//! # Responsibility
//! - Define the fixed per-phase hook interface extensions implement.
//! - Keep registration, enablement, and dispatch in one explicit registry
//!   object passed by reference into the host's run wiring.
//!
//! # Invariants
//! - Hooks are invoked synchronously, one phase at a time, in registration
//!   order; no hook may block on I/O.
//! - Hook failures never escape the dispatch boundary: startup failures
//!   abort startup, run-phase failures degrade the extension and continue.

use crate::config::{ArgSchema, ConfigError, RunConfig};
use crate::runner::{RunReport, ScenarioResult, StepResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod dev_mode;
pub mod registry;

pub use dev_mode::DevModeExtension;
pub use registry::{DispatchError, ExtensionRegistry, RegistryError};

pub type HookResult = Result<(), ExtensionHookError>;

/// Failure reported by one extension hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionHookError {
    /// Configuration-surface failure (flag conflict, frozen config).
    Config(ConfigError),
    /// Extension-specific failure with a human-readable reason.
    Failed(String),
}

impl Display for ExtensionHookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Failed(reason) => write!(f, "extension hook failed: {reason}"),
        }
    }
}

impl Error for ExtensionHookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Failed(_) => None,
        }
    }
}

impl From<ConfigError> for ExtensionHookError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

/// Registry-visible lifecycle state of one extension.
///
/// Entries are `Registered` on insertion, become `Active` once the
/// configuration-ready dispatch completes, and return to `Registered`
/// after cleanup so the registry can be reused across runs in one
/// process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionState {
    Registered,
    Active,
}

/// Dispatch health of one extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionHealth {
    Healthy,
    /// At least one run-phase hook failed during the current process.
    Degraded,
}

/// Unit of optional behavior registered into the pipeline.
///
/// Every hook has a no-op default, so extensions only implement the
/// phases they participate in. Hooks must be idempotent across pipeline
/// runs in the same process: the host may reuse the registry for
/// long-lived interactive workflows.
pub trait Extension {
    /// Stable extension identifier, e.g. `stepwise.dev_mode`.
    fn id(&self) -> &str;

    /// Flag declarations are being assembled.
    ///
    /// Contract: register flags, nothing else; return promptly.
    fn on_argument_schema(&mut self, _schema: &mut ArgSchema) -> HookResult {
        Ok(())
    }

    /// Arguments are parsed into the finalized, not-yet-locked config.
    ///
    /// This is the only window in which extensions may mutate the run
    /// configuration.
    fn on_configuration_ready(&mut self, _config: &mut RunConfig) -> HookResult {
        Ok(())
    }

    /// The configuration is locked and the run is about to begin.
    fn on_run_started(&mut self, _config: &RunConfig) -> HookResult {
        Ok(())
    }

    fn on_scenario_run(&mut self, _scenario: &ScenarioResult) -> HookResult {
        Ok(())
    }

    fn on_step_run(&mut self, _step: &StepResult) -> HookResult {
        Ok(())
    }

    fn on_step_passed(&mut self, _step: &StepResult) -> HookResult {
        Ok(())
    }

    fn on_step_failed(&mut self, _step: &StepResult) -> HookResult {
        Ok(())
    }

    fn on_scenario_passed(&mut self, _scenario: &ScenarioResult) -> HookResult {
        Ok(())
    }

    fn on_scenario_failed(&mut self, _scenario: &ScenarioResult) -> HookResult {
        Ok(())
    }

    fn on_run_finished(&mut self, _report: &RunReport) -> HookResult {
        Ok(())
    }

    /// Final phase; extensions release per-run state here.
    fn on_cleanup(&mut self, _report: &RunReport) -> HookResult {
        Ok(())
    }
}
