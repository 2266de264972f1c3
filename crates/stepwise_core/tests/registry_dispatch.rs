use std::sync::{Arc, Mutex};
use stepwise_core::{
    ArgSchema, Extension, ExtensionHealth, ExtensionHookError, ExtensionRegistry, ExtensionState,
    HookResult, RegistryError, RunConfig, RunReport, StepResult,
};

/// Probe recording every hook invocation into a shared journal.
struct JournalExtension {
    id: String,
    journal: Arc<Mutex<Vec<String>>>,
    fail_on_configuration: bool,
}

impl JournalExtension {
    fn new(id: &str, journal: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            id: id.to_string(),
            journal,
            fail_on_configuration: false,
        }
    }

    fn record(&self, hook: &str) {
        let mut guard = match self.journal.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(format!("{}:{hook}", self.id));
    }
}

impl Extension for JournalExtension {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_argument_schema(&mut self, _schema: &mut ArgSchema) -> HookResult {
        self.record("argument_schema");
        Ok(())
    }

    fn on_configuration_ready(&mut self, _config: &mut RunConfig) -> HookResult {
        self.record("configuration_ready");
        if self.fail_on_configuration {
            return Err(ExtensionHookError::Failed("probe startup failure".to_string()));
        }
        Ok(())
    }

    fn on_step_run(&mut self, step: &StepResult) -> HookResult {
        self.record(&format!("step_run:{}", step.step_name));
        Ok(())
    }

    fn on_cleanup(&mut self, _report: &RunReport) -> HookResult {
        self.record("cleanup");
        Ok(())
    }
}

fn journal_entries(journal: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    match journal.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

#[test]
fn hooks_fire_in_registration_order() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ExtensionRegistry::new();
    registry
        .register(Box::new(JournalExtension::new("probe.beta", journal.clone())))
        .expect("first registration");
    registry
        .register(Box::new(JournalExtension::new(
            "probe.alpha",
            journal.clone(),
        )))
        .expect("second registration");

    let mut schema = ArgSchema::new();
    registry
        .dispatch_argument_schema(&mut schema)
        .expect("schema dispatch");

    assert_eq!(
        journal_entries(&journal),
        vec!["probe.beta:argument_schema", "probe.alpha:argument_schema"],
        "registration order, not id order"
    );
}

#[test]
fn disabled_extension_is_skipped_and_can_be_reenabled() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ExtensionRegistry::new();
    registry
        .register(Box::new(JournalExtension::new("probe.one", journal.clone())))
        .expect("registration");

    registry
        .set_enabled("probe.one", false)
        .expect("disable toggle");
    assert_eq!(registry.is_enabled("probe.one"), Some(false));
    registry.dispatch_step_run(&StepResult::new("quiet"));
    assert!(journal_entries(&journal).is_empty());

    registry
        .set_enabled("probe.one", true)
        .expect("enable toggle");
    registry.dispatch_step_run(&StepResult::new("loud"));
    assert_eq!(journal_entries(&journal), vec!["probe.one:step_run:loud"]);
}

#[test]
fn startup_failure_aborts_dispatch_and_names_the_extension() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ExtensionRegistry::new();

    let mut failing = JournalExtension::new("probe.broken", journal.clone());
    failing.fail_on_configuration = true;
    registry
        .register(Box::new(failing))
        .expect("failing extension registration");
    registry
        .register(Box::new(JournalExtension::new("probe.late", journal.clone())))
        .expect("second registration");

    let mut config = RunConfig::new();
    let err = registry
        .dispatch_configuration_ready(&mut config)
        .expect_err("startup failure must abort");
    assert_eq!(err.extension_id, "probe.broken");

    let entries = journal_entries(&journal);
    assert_eq!(
        entries,
        vec!["probe.broken:configuration_ready"],
        "later extensions are not invoked after a fatal startup failure"
    );
}

#[test]
fn duplicate_registration_is_rejected() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ExtensionRegistry::new();
    registry
        .register(Box::new(JournalExtension::new("probe.one", journal.clone())))
        .expect("first registration");

    let err = registry
        .register(Box::new(JournalExtension::new("probe.one", journal)))
        .expect_err("duplicate id must be rejected");
    assert_eq!(
        err,
        RegistryError::DuplicateExtensionId("probe.one".to_string())
    );
}

#[test]
fn lifecycle_state_round_trips_across_one_run() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ExtensionRegistry::new();
    registry
        .register(Box::new(JournalExtension::new("probe.one", journal)))
        .expect("registration");

    assert_eq!(registry.state("probe.one"), Some(ExtensionState::Registered));
    assert_eq!(registry.health("probe.one"), Some(ExtensionHealth::Healthy));

    let mut config = RunConfig::new();
    registry
        .dispatch_configuration_ready(&mut config)
        .expect("configuration dispatch");
    assert_eq!(registry.state("probe.one"), Some(ExtensionState::Active));

    registry.dispatch_cleanup(&RunReport::new());
    assert_eq!(registry.state("probe.one"), Some(ExtensionState::Registered));
}
