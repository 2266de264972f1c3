use std::sync::Arc;
use stepwise_core::{
    ArgSchema, DevModeExtension, ExtensionRegistry, PipelineRunner, PlainStepScheduler,
    RecordingConsole, RunConfig, Scenario, SessionTrackerExtension, Step, StepStatus,
    KEY_REPORTER, REPORTER_DEFAULT,
};

fn wired_registry(console: Arc<RecordingConsole>) -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    registry
        .register(Box::new(DevModeExtension::new()))
        .expect("dev-mode extension registration");
    registry
        .register(Box::new(SessionTrackerExtension::new(console)))
        .expect("session tracker registration");
    registry
}

fn startup(registry: &mut ExtensionRegistry, tokens: &[&str]) -> RunConfig {
    let mut schema = ArgSchema::new();
    registry
        .dispatch_argument_schema(&mut schema)
        .expect("schema dispatch");

    let mut config = RunConfig::new();
    config
        .set_text(KEY_REPORTER, REPORTER_DEFAULT)
        .expect("host default reporter");
    schema
        .parse_into(tokens, &mut config)
        .expect("token parsing");
    registry
        .dispatch_configuration_ready(&mut config)
        .expect("configuration dispatch");
    config.lock();
    config
}

fn demo_scenario() -> Scenario {
    Scenario::new(
        "logs in",
        "scenarios/login.rs",
        vec![
            Step::new("given_user", Box::new(|| Ok(()))),
            Step::new("when_login", Box::new(|| Err("bad password".to_string()))),
        ],
    )
}

#[test]
fn dev_run_publishes_step_transitions_to_the_console() {
    let console = Arc::new(RecordingConsole::new());
    let mut registry = wired_registry(console.clone());
    let config = startup(&mut registry, &["--dev"]);

    let mut runner = PipelineRunner::new(PlainStepScheduler::new());
    runner.run(&mut registry, &config, vec![demo_scenario()]);

    let snapshots = console.snapshots();
    assert!(!snapshots.is_empty(), "dev run must publish snapshots");

    let first = &snapshots[0];
    assert_eq!(first.scenario.subject, "logs in");
    assert!(first
        .steps
        .iter()
        .all(|step| step.status == StepStatus::Pending));

    let last = snapshots.last().expect("final snapshot");
    assert_eq!(last.steps[0].status, StepStatus::Passed);
    assert_eq!(last.steps[1].status, StepStatus::Failed);
}

#[test]
fn snapshots_list_steps_by_declared_index() {
    let console = Arc::new(RecordingConsole::new());
    let mut registry = wired_registry(console.clone());
    let config = startup(&mut registry, &["--dev"]);

    let scenario = Scenario::new(
        "unordered names",
        "scenarios/unordered.rs",
        vec![
            Step::new("zulu", Box::new(|| Ok(()))),
            Step::new("alpha", Box::new(|| Ok(()))),
        ],
    );
    let mut runner = PipelineRunner::new(PlainStepScheduler::new());
    runner.run(&mut registry, &config, vec![scenario]);

    let last = console.last().expect("final snapshot");
    let indices: Vec<u32> = last.steps.iter().map(|step| step.index).collect();
    assert_eq!(indices, vec![0, 1]);
    assert_eq!(last.steps[0].name, "zulu");
    assert_eq!(last.steps[1].name, "alpha");
}

#[test]
fn without_dev_flag_the_tracker_publishes_nothing() {
    let console = Arc::new(RecordingConsole::new());
    let mut registry = wired_registry(console.clone());
    let config = startup(&mut registry, &[]);

    let mut runner = PipelineRunner::new(PlainStepScheduler::new());
    runner.run(&mut registry, &config, vec![demo_scenario()]);

    assert!(
        console.snapshots().is_empty(),
        "tracker must stay inert without --dev"
    );
}

#[test]
fn tracker_latch_resets_between_runs() {
    let console = Arc::new(RecordingConsole::new());
    let mut registry = wired_registry(console.clone());

    let config = startup(&mut registry, &["--dev"]);
    let mut runner = PipelineRunner::new(PlainStepScheduler::new());
    runner.run(&mut registry, &config, vec![demo_scenario()]);
    let after_dev_run = console.snapshots().len();
    assert!(after_dev_run > 0);

    let config = startup(&mut registry, &[]);
    runner.run(&mut registry, &config, vec![demo_scenario()]);
    assert_eq!(
        console.snapshots().len(),
        after_dev_run,
        "second run without --dev must not publish"
    );
}

#[test]
fn snapshot_serialization_uses_stable_field_names() {
    let console = Arc::new(RecordingConsole::new());
    let mut registry = wired_registry(console.clone());
    let config = startup(&mut registry, &["--dev"]);

    let mut runner = PipelineRunner::new(PlainStepScheduler::new());
    runner.run(&mut registry, &config, vec![demo_scenario()]);

    let last = console.last().expect("final snapshot");
    let json = serde_json::to_value(&last).expect("snapshot serializes");

    assert!(json["scenario"]["unique_id"].is_string());
    assert_eq!(json["scenario"]["subject"], "logs in");
    assert_eq!(json["scenario"]["rel_path"], "scenarios/login.rs");
    assert_eq!(json["steps"][0]["index"], 0);
    assert_eq!(json["steps"][0]["name"], "given_user");
    assert_eq!(json["steps"][0]["status"], "passed");
    assert_eq!(json["steps"][1]["status"], "failed");
}
