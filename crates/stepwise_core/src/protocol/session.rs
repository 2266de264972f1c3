//! Dev session tracking and console publication.
//!
//! # Responsibility
//! - Maintain the active scenario's step table across run events.
//! - Publish a state snapshot to the console at every transition.
//! - Apply console control actions to the dev step scheduler.
//!
//! # Invariants
//! - Status transitions for unknown step names are ignored; the session
//!   stays inert under host skew instead of failing the run.
//! - Snapshots always list steps sorted by declared index.

use super::{DevConsole, ScenarioInfo, StateSnapshot, StepInfo, StepStatus};
use crate::config::{RunConfig, KEY_DEV};
use crate::extension::{Extension, HookResult};
use crate::runner::{
    DevStepScheduler, RunReport, ScenarioResult, ScenarioSource, StepResult,
};
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Control-action application errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No scenario has been started in this session.
    NoActiveScenario,
    /// Named step is not part of the active scenario, or the source
    /// could not re-materialize it.
    StepNotFound(String),
    /// The active scenario declares no steps to run next.
    EmptyStepTable,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveScenario => write!(f, "no active scenario in dev session"),
            Self::StepNotFound(name) => write!(f, "step not found: {name}"),
            Self::EmptyStepTable => write!(f, "active scenario has no steps"),
        }
    }
}

impl Error for SessionError {}

/// Step table and console publisher for one dev-mode scenario.
pub struct DevSession {
    console: Arc<dyn DevConsole>,
    scenario: Option<ScenarioInfo>,
    steps: BTreeMap<String, StepInfo>,
}

impl DevSession {
    pub fn new(console: Arc<dyn DevConsole>) -> Self {
        Self {
            console,
            scenario: None,
            steps: BTreeMap::new(),
        }
    }

    /// Resets the session to a new scenario's step table and publishes
    /// the initial all-pending snapshot.
    pub fn begin(&mut self, scenario: &ScenarioResult) {
        self.scenario = Some(ScenarioInfo {
            unique_id: scenario.scenario_id,
            subject: scenario.subject.clone(),
            rel_path: scenario.rel_path.clone(),
        });
        self.steps = scenario
            .planned_steps
            .iter()
            .enumerate()
            .map(|(index, name)| {
                (
                    name.clone(),
                    StepInfo {
                        index: index as u32,
                        name: name.clone(),
                        status: StepStatus::Pending,
                    },
                )
            })
            .collect();
        self.publish();
    }

    /// Records one step status transition and publishes the new state.
    ///
    /// Unknown step names are ignored.
    pub fn mark_step(&mut self, step_name: &str, status: StepStatus) {
        let Some(info) = self.steps.get_mut(step_name) else {
            return;
        };
        info.status = status;
        self.publish();
    }

    /// Returns the current snapshot; `None` before the first scenario.
    pub fn snapshot(&self) -> Option<StateSnapshot> {
        let scenario = self.scenario.clone()?;
        let mut steps: Vec<StepInfo> = self.steps.values().cloned().collect();
        steps.sort_by_key(|step| step.index);
        Some(StateSnapshot { scenario, steps })
    }

    /// Publishes the current snapshot to the console.
    pub fn publish(&self) {
        if let Some(snapshot) = self.snapshot() {
            self.console.state_changed(&snapshot);
        }
    }

    /// Applies one console action against the dev scheduler.
    ///
    /// Steps are re-materialized through `source`, so a re-run executes
    /// a fresh body even though the original was consumed already.
    ///
    /// # Errors
    /// - `SessionError::NoActiveScenario` before the first scenario.
    /// - `SessionError::StepNotFound` for names outside the step table
    ///   or names the source cannot load.
    /// - `SessionError::EmptyStepTable` for `RunNextStep { step: None }`
    ///   on a scenario without steps.
    pub fn apply_action(
        &mut self,
        action: &super::ControlAction,
        source: &dyn ScenarioSource,
        scheduler: &mut DevStepScheduler,
    ) -> Result<(), SessionError> {
        match action {
            super::ControlAction::RunSpecificStep { step } => {
                self.schedule_step(step, source, scheduler)
            }
            super::ControlAction::RunToStep { steps } => {
                let mut ordered: Vec<&StepInfo> = Vec::new();
                for name in steps {
                    match self.steps.get(name.as_str()) {
                        Some(info) => ordered.push(info),
                        None => return Err(SessionError::StepNotFound(name.clone())),
                    }
                }
                ordered.sort_by_key(|info| info.index);

                let names: Vec<String> = ordered.iter().map(|info| info.name.clone()).collect();
                for name in names {
                    self.schedule_step(&name, source, scheduler)?;
                }
                scheduler.finish();
                Ok(())
            }
            super::ControlAction::RunNextStep { step } => match step {
                Some(name) => self.schedule_step(name, source, scheduler),
                None => {
                    let first = self
                        .steps
                        .values()
                        .find(|info| info.index == 0)
                        .map(|info| info.name.clone())
                        .ok_or(SessionError::EmptyStepTable)?;
                    self.schedule_step(&first, source, scheduler)
                }
            },
            super::ControlAction::UpdateState => {
                self.publish();
                Ok(())
            }
        }
    }

    fn schedule_step(
        &mut self,
        step_name: &str,
        source: &dyn ScenarioSource,
        scheduler: &mut DevStepScheduler,
    ) -> Result<(), SessionError> {
        let scenario = self
            .scenario
            .as_ref()
            .ok_or(SessionError::NoActiveScenario)?;
        if !self.steps.contains_key(step_name) {
            return Err(SessionError::StepNotFound(step_name.to_string()));
        }

        let step = source
            .load_step(scenario.unique_id, step_name)
            .ok_or_else(|| SessionError::StepNotFound(step_name.to_string()))?;
        info!(
            "event=step_scheduled module=protocol status=ok scenario_id={} step={step_name}",
            scenario.unique_id
        );
        scheduler.schedule(step);
        self.mark_step(step_name, StepStatus::Pending);
        Ok(())
    }
}

/// Extension feeding run events into a [`DevSession`].
///
/// Latches on when the locked-in `dev` flag is true at the
/// configuration-ready phase and stays inert otherwise, so wiring it
/// into the registry unconditionally is safe.
pub struct SessionTrackerExtension {
    session: DevSession,
    active: bool,
}

impl SessionTrackerExtension {
    pub fn new(console: Arc<dyn DevConsole>) -> Self {
        Self {
            session: DevSession::new(console),
            active: false,
        }
    }

    pub fn session(&self) -> &DevSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DevSession {
        &mut self.session
    }
}

impl Extension for SessionTrackerExtension {
    fn id(&self) -> &str {
        "stepwise.session_tracker"
    }

    fn on_configuration_ready(&mut self, config: &mut RunConfig) -> HookResult {
        self.active = config.bool_or_default(KEY_DEV);
        Ok(())
    }

    fn on_scenario_run(&mut self, scenario: &ScenarioResult) -> HookResult {
        if self.active {
            self.session.begin(scenario);
        }
        Ok(())
    }

    fn on_step_run(&mut self, step: &StepResult) -> HookResult {
        if self.active {
            self.session.mark_step(&step.step_name, StepStatus::Running);
        }
        Ok(())
    }

    fn on_step_passed(&mut self, step: &StepResult) -> HookResult {
        if self.active {
            self.session.mark_step(&step.step_name, StepStatus::Passed);
        }
        Ok(())
    }

    fn on_step_failed(&mut self, step: &StepResult) -> HookResult {
        if self.active {
            self.session.mark_step(&step.step_name, StepStatus::Failed);
        }
        Ok(())
    }

    fn on_scenario_passed(&mut self, _scenario: &ScenarioResult) -> HookResult {
        if self.active {
            self.session.publish();
        }
        Ok(())
    }

    fn on_scenario_failed(&mut self, _scenario: &ScenarioResult) -> HookResult {
        if self.active {
            self.session.publish();
        }
        Ok(())
    }

    fn on_cleanup(&mut self, _report: &RunReport) -> HookResult {
        self.active = false;
        Ok(())
    }
}
