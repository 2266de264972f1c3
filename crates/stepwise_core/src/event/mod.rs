//! Lifecycle phase vocabulary for the extension pipeline.
//!
//! # Responsibility
//! - Name every phase boundary at which registered extensions are invoked.
//! - Keep phase ordering explicit so dispatch stays deterministic.
//!
//! # Invariants
//! - The phase set is closed; extensions implement a fixed interface with
//!   one hook per phase instead of subscribing by name.
//! - Startup phases (`ArgumentSchema`, `ConfigurationReady`) run before the
//!   run configuration is locked; all other phases observe a locked run.

use serde::Serialize;

/// Fixed point in pipeline execution at which extension hooks fire.
///
/// Variants are declared in pipeline order, so the derived `Ord` matches
/// the order in which a single run crosses each boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// Flag declarations are being assembled; the schema is still mutable.
    ArgumentSchema,
    /// Arguments are parsed into the run configuration, not yet locked.
    ConfigurationReady,
    /// The run configuration is locked and execution is about to begin.
    RunStarted,
    /// One scenario is about to execute.
    ScenarioRun,
    /// One step is about to execute.
    StepRun,
    StepPassed,
    StepFailed,
    ScenarioPassed,
    ScenarioFailed,
    /// All scenarios finished; the aggregated report is available.
    RunFinished,
    /// Final phase; extensions release per-run state here.
    Cleanup,
}

/// Every phase in pipeline order.
pub const ALL_PHASES: &[LifecyclePhase] = &[
    LifecyclePhase::ArgumentSchema,
    LifecyclePhase::ConfigurationReady,
    LifecyclePhase::RunStarted,
    LifecyclePhase::ScenarioRun,
    LifecyclePhase::StepRun,
    LifecyclePhase::StepPassed,
    LifecyclePhase::StepFailed,
    LifecyclePhase::ScenarioPassed,
    LifecyclePhase::ScenarioFailed,
    LifecyclePhase::RunFinished,
    LifecyclePhase::Cleanup,
];

impl LifecyclePhase {
    /// Stable string id used in logging events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ArgumentSchema => "argument_schema",
            Self::ConfigurationReady => "configuration_ready",
            Self::RunStarted => "run_started",
            Self::ScenarioRun => "scenario_run",
            Self::StepRun => "step_run",
            Self::StepPassed => "step_passed",
            Self::StepFailed => "step_failed",
            Self::ScenarioPassed => "scenario_passed",
            Self::ScenarioFailed => "scenario_failed",
            Self::RunFinished => "run_finished",
            Self::Cleanup => "cleanup",
        }
    }

    /// True for phases that run before the configuration is locked.
    ///
    /// A hook failure in a startup phase is fatal to the run; failures in
    /// later phases degrade the extension without aborting execution.
    pub fn is_startup(self) -> bool {
        matches!(self, Self::ArgumentSchema | Self::ConfigurationReady)
    }
}
