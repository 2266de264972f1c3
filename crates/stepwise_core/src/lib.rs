//! Extension core for a pluggable scenario test pipeline.
//! This crate is the single source of truth for lifecycle and dispatch
//! invariants.

pub mod config;
pub mod event;
pub mod extension;
pub mod logging;
pub mod protocol;
pub mod runner;

pub use config::{
    ArgSchema, ConfigError, ConfigResult, ConfigValue, FlagSpec, RunConfig, KEY_DEV,
    KEY_DIAGNOSTICS, KEY_REPORTER, REPORTER_DEFAULT, REPORTER_SILENT,
};
pub use event::{LifecyclePhase, ALL_PHASES};
pub use extension::{
    dev_mode::DEV_MODE_EXTENSION_ID, DevModeExtension, DispatchError, Extension, ExtensionHealth,
    ExtensionHookError, ExtensionRegistry, ExtensionState, HookResult, RegistryError,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use protocol::{
    ControlAction, DevConsole, DevSession, RecordingConsole, ScenarioInfo, SessionError,
    SessionTrackerExtension, StateSnapshot, StepInfo, StepStatus,
};
pub use runner::{
    DevStepScheduler, PipelineRunner, PlainStepScheduler, RunReport, Scenario, ScenarioId,
    ScenarioResult, ScenarioSource, ScenarioStatus, Step, StepOutcome, StepResult, StepScheduler,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
