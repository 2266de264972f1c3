//! CLI probe for the extension core.
//!
//! # Responsibility
//! - Wire the registry, dev-mode extension, and runner end to end.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;
use std::sync::Arc;
use stepwise_core::{
    ArgSchema, DevConsole, DevModeExtension, ExtensionRegistry, PipelineRunner,
    PlainStepScheduler, RunConfig, Scenario, SessionTrackerExtension, StateSnapshot, Step,
    KEY_REPORTER, REPORTER_DEFAULT,
};

/// Console sink printing each snapshot as one line per step.
struct StdoutConsole;

impl DevConsole for StdoutConsole {
    fn state_changed(&self, snapshot: &StateSnapshot) {
        for step in &snapshot.steps {
            println!(
                "console scenario={} step={} status={:?}",
                snapshot.scenario.subject, step.name, step.status
            );
        }
    }
}

fn demo_scenario() -> Scenario {
    Scenario::new(
        "greets the user",
        "scenarios/greeting.rs",
        vec![
            Step::new("given_name", Box::new(|| Ok(()))),
            Step::new("when_greeting_is_built", Box::new(|| Ok(()))),
            Step::new("then_greeting_is_friendly", Box::new(|| Ok(()))),
        ],
    )
}

fn run(tokens: &[String]) -> Result<(), String> {
    let mut registry = ExtensionRegistry::new();
    registry
        .register(Box::new(DevModeExtension::new()))
        .map_err(|err| err.to_string())?;
    registry
        .register(Box::new(SessionTrackerExtension::new(Arc::new(
            StdoutConsole,
        ))))
        .map_err(|err| err.to_string())?;

    let mut schema = ArgSchema::new();
    registry
        .dispatch_argument_schema(&mut schema)
        .map_err(|err| err.to_string())?;

    let mut config = RunConfig::new();
    config
        .set_text(KEY_REPORTER, REPORTER_DEFAULT)
        .map_err(|err| err.to_string())?;
    schema
        .parse_into(tokens, &mut config)
        .map_err(|err| err.to_string())?;
    registry
        .dispatch_configuration_ready(&mut config)
        .map_err(|err| err.to_string())?;
    config.lock();

    println!("stepwise version={}", stepwise_core::core_version());
    for key in config.keys() {
        let value = match config.get(key) {
            Some(stepwise_core::ConfigValue::Bool(value)) => value.to_string(),
            Some(stepwise_core::ConfigValue::Text(value)) => value.clone(),
            None => continue,
        };
        println!("config {key}={value}");
    }

    let mut runner = PipelineRunner::new(PlainStepScheduler::new());
    let report = runner.run(&mut registry, &config, vec![demo_scenario()]);
    println!(
        "report total={} passed={} failed={} skipped={}",
        report.total(),
        report.passed_count(),
        report.failed_count(),
        report.skipped_count()
    );
    Ok(())
}

fn main() -> ExitCode {
    let tokens: Vec<String> = std::env::args().skip(1).collect();
    match run(&tokens) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("stepwise: {message}");
            ExitCode::FAILURE
        }
    }
}
