//! Scenario and step model with per-run result records.
//!
//! # Responsibility
//! - Define the canonical scenario/step shapes executed by the runner.
//! - Carry pass/fail/skip outcomes with epoch-millisecond timing.
//!
//! # Invariants
//! - `ScenarioId` is stable for the lifetime of a scenario and never
//!   reused for another scenario.
//! - Result records are append-only; a finished result is never mutated
//!   by later phases.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for one scenario.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ScenarioId = Uuid;

/// Step body invoked by the runner; failures are reported as messages.
pub type StepBody = Box<dyn FnMut() -> Result<(), String>>;

/// One named, executable step of a scenario.
pub struct Step {
    name: String,
    body: StepBody,
}

impl Step {
    pub fn new(name: impl Into<String>, body: StepBody) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Executes the step body once.
    pub fn run(&mut self) -> Result<(), String> {
        (self.body)()
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// One executable scenario with its declared steps.
#[derive(Debug)]
pub struct Scenario {
    pub id: ScenarioId,
    /// Human-readable subject line.
    pub subject: String,
    /// Path of the defining source, relative to the project root.
    pub rel_path: String,
    skipped: bool,
    steps: Vec<Step>,
}

impl Scenario {
    /// Creates a scenario with a generated stable id.
    pub fn new(subject: impl Into<String>, rel_path: impl Into<String>, steps: Vec<Step>) -> Self {
        Self::with_id(Uuid::new_v4(), subject, rel_path, steps)
    }

    /// Creates a scenario with a caller-provided stable id.
    ///
    /// Used by sources that re-materialize steps for an already-known
    /// scenario identity.
    pub fn with_id(
        id: ScenarioId,
        subject: impl Into<String>,
        rel_path: impl Into<String>,
        steps: Vec<Step>,
    ) -> Self {
        Self {
            id,
            subject: subject.into(),
            rel_path: rel_path.into(),
            skipped: false,
            steps,
        }
    }

    /// Marks the scenario as skipped; the runner records it without
    /// executing any step.
    pub fn skip(mut self) -> Self {
        self.skipped = true;
        self
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.name.clone()).collect()
    }

    /// Consumes the scenario, returning its steps for scheduling.
    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}

/// Source able to re-materialize steps for a known scenario.
///
/// This is the seam a dev console uses to obtain a fresh step body when
/// re-running a step that was already consumed by the scheduler.
pub trait ScenarioSource {
    fn load_step(&self, scenario_id: ScenarioId, step_name: &str) -> Option<Step>;
}

/// Terminal outcome of one executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    Failed,
}

/// Result record for one step invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub step_name: String,
    /// `None` while the step is still running.
    pub outcome: Option<StepOutcome>,
    /// Failure message reported by the step body.
    pub error: Option<String>,
    pub started_at_ms: Option<i64>,
    pub ended_at_ms: Option<i64>,
}

impl StepResult {
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            outcome: None,
            error: None,
            started_at_ms: None,
            ended_at_ms: None,
        }
    }

    pub fn mark_started(&mut self) {
        self.started_at_ms = Some(epoch_ms());
    }

    pub fn mark_passed(&mut self) {
        self.ended_at_ms = Some(epoch_ms());
        self.outcome = Some(StepOutcome::Passed);
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.ended_at_ms = Some(epoch_ms());
        self.outcome = Some(StepOutcome::Failed);
        self.error = Some(error.into());
    }

    pub fn is_failed(&self) -> bool {
        self.outcome == Some(StepOutcome::Failed)
    }
}

/// Terminal status of one scenario execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioStatus {
    /// Execution has not finished yet.
    Pending,
    Passed,
    Failed,
    Skipped,
}

/// Result record for one scenario execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioResult {
    pub scenario_id: ScenarioId,
    pub subject: String,
    pub rel_path: String,
    /// Step names in declared order, recorded before execution starts.
    pub planned_steps: Vec<String>,
    pub step_results: Vec<StepResult>,
    pub status: ScenarioStatus,
    pub started_at_ms: Option<i64>,
    pub ended_at_ms: Option<i64>,
}

impl ScenarioResult {
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            scenario_id: scenario.id,
            subject: scenario.subject.clone(),
            rel_path: scenario.rel_path.clone(),
            planned_steps: scenario.step_names(),
            step_results: Vec::new(),
            status: ScenarioStatus::Pending,
            started_at_ms: None,
            ended_at_ms: None,
        }
    }

    pub fn mark_started(&mut self) {
        self.started_at_ms = Some(epoch_ms());
    }

    pub fn mark_ended(&mut self) {
        self.ended_at_ms = Some(epoch_ms());
    }

    pub fn mark_passed(&mut self) {
        self.status = ScenarioStatus::Passed;
    }

    pub fn mark_failed(&mut self) {
        self.status = ScenarioStatus::Failed;
    }

    pub fn mark_skipped(&mut self) {
        self.status = ScenarioStatus::Skipped;
    }

    pub fn add_step_result(&mut self, result: StepResult) {
        self.step_results.push(result);
    }

    pub fn has_failed_steps(&self) -> bool {
        self.step_results.iter().any(StepResult::is_failed)
    }
}

/// Aggregated results for one pipeline run.
#[derive(Debug, Default)]
pub struct RunReport {
    results: Vec<ScenarioResult>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, result: ScenarioResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed_count(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    pub fn failed_count(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    /// True when no scenario failed.
    pub fn is_ok(&self) -> bool {
        self.failed_count() == 0
    }

    fn count(&self, status: ScenarioStatus) -> usize {
        self.results
            .iter()
            .filter(|result| result.status == status)
            .count()
    }
}

/// Unix epoch milliseconds for result timestamps.
fn epoch_ms() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_millis() as i64,
        // Clock before epoch: clamp instead of failing result bookkeeping.
        Err(_) => 0,
    }
}
