//! Pipeline runner driving scenarios through extension dispatch.

use super::scenario::{RunReport, Scenario, ScenarioResult, StepResult};
use super::scheduler::StepScheduler;
use crate::config::RunConfig;
use crate::extension::ExtensionRegistry;
use log::info;

/// Synchronous scenario runner.
///
/// Fires extension hooks at every phase boundary, one phase at a time,
/// in registration order. The run configuration passed to `run` is
/// expected to be locked; the runner never mutates it.
pub struct PipelineRunner<S: StepScheduler> {
    scheduler: S,
}

impl<S: StepScheduler> PipelineRunner<S> {
    pub fn new(scheduler: S) -> Self {
        Self { scheduler }
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Runs every scenario and dispatches run-level phases around them.
    pub fn run(
        &mut self,
        registry: &mut ExtensionRegistry,
        config: &RunConfig,
        scenarios: Vec<Scenario>,
    ) -> RunReport {
        info!(
            "event=run_started module=runner status=ok scenario_count={}",
            scenarios.len()
        );
        registry.dispatch_run_started(config);

        let mut report = RunReport::new();
        for scenario in scenarios {
            let result = self.run_scenario(registry, scenario);
            report.add_result(result);
        }

        registry.dispatch_run_finished(&report);
        registry.dispatch_cleanup(&report);
        info!(
            "event=run_finished module=runner status=ok total={} passed={} failed={} skipped={}",
            report.total(),
            report.passed_count(),
            report.failed_count(),
            report.skipped_count()
        );
        report
    }

    /// Runs one scenario through the scheduler.
    ///
    /// Skipped scenarios are recorded without executing steps or firing
    /// scenario-phase hooks.
    pub fn run_scenario(
        &mut self,
        registry: &mut ExtensionRegistry,
        scenario: Scenario,
    ) -> ScenarioResult {
        let mut result = ScenarioResult::new(&scenario);
        if scenario.is_skipped() {
            result.mark_skipped();
            return result;
        }

        registry.dispatch_scenario_run(&result);
        result.mark_started();
        self.scheduler.start(scenario.into_steps());

        while let Some(mut step) = self.scheduler.next_step() {
            let mut step_result = StepResult::new(step.name());
            registry.dispatch_step_run(&step_result);
            step_result.mark_started();

            match step.run() {
                Ok(()) => {
                    step_result.mark_passed();
                    registry.dispatch_step_passed(&step_result);
                }
                Err(reason) => {
                    step_result.mark_failed(reason);
                    registry.dispatch_step_failed(&step_result);
                }
            }
            result.add_step_result(step_result);
        }

        result.mark_ended();
        if result.has_failed_steps() {
            result.mark_failed();
            registry.dispatch_scenario_failed(&result);
        } else {
            result.mark_passed();
            registry.dispatch_scenario_passed(&result);
        }
        result
    }
}
