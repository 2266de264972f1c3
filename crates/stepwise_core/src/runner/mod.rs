//! Scenario execution layer.
//!
//! # Responsibility
//! - Define the scenario/step model and per-run result records.
//! - Drive scheduled steps through the extension registry's dispatchers.
//! - Keep step ordering pluggable via the scheduler contract.
//!
//! # Invariants
//! - Execution is synchronous and single-threaded; hooks fire in process
//!   order at every phase boundary.
//! - A scenario is failed when any of its steps failed.

pub mod pipeline;
pub mod scenario;
pub mod scheduler;

pub use pipeline::PipelineRunner;
pub use scenario::{
    RunReport, Scenario, ScenarioId, ScenarioResult, ScenarioSource, ScenarioStatus, Step,
    StepOutcome, StepResult,
};
pub use scheduler::{DevStepScheduler, PlainStepScheduler, StepScheduler};
