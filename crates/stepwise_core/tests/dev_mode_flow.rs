use stepwise_core::{
    ArgSchema, ConfigError, DevModeExtension, ExtensionHookError, ExtensionRegistry, RunConfig,
    KEY_DEV, KEY_DIAGNOSTICS, KEY_REPORTER, REPORTER_DEFAULT, REPORTER_SILENT,
};

fn startup_registry() -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    registry
        .register(Box::new(DevModeExtension::new()))
        .expect("dev-mode extension registration");
    registry
}

/// Runs the host startup flow: schema dispatch, token parsing,
/// configuration dispatch, lock.
fn startup(tokens: &[&str]) -> RunConfig {
    let mut registry = startup_registry();

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

#[test]
fn dev_token_forces_silent_reporter_and_diagnostics() {
    let config = startup(&["--dev"]);

    assert!(config.bool_or_default(KEY_DEV));
    assert_eq!(config.text(KEY_REPORTER), Some(REPORTER_SILENT));
    assert!(config.bool_or_default(KEY_DIAGNOSTICS));
}

#[test]
fn without_dev_token_host_defaults_are_untouched() {
    let config = startup(&[]);

    assert!(!config.bool_or_default(KEY_DEV), "default is off");
    assert_eq!(config.text(KEY_REPORTER), Some(REPORTER_DEFAULT));
    assert!(!config.contains(KEY_DIAGNOSTICS));
}

#[test]
fn configuration_is_frozen_after_startup() {
    let mut config = startup(&["--dev"]);

    let err = config
        .set_text(KEY_REPORTER, REPORTER_DEFAULT)
        .expect_err("locked configuration must reject writes");
    assert_eq!(
        err,
        ConfigError::ConfigurationFrozen(KEY_REPORTER.to_string())
    );
}

#[test]
fn dispatching_the_schema_phase_twice_is_a_fatal_conflict() {
    let mut registry = startup_registry();
    let mut schema = ArgSchema::new();
    registry
        .dispatch_argument_schema(&mut schema)
        .expect("first schema dispatch");

    let err = registry
        .dispatch_argument_schema(&mut schema)
        .expect_err("second dispatch without reset must fail");
    assert_eq!(err.extension_id, "stepwise.dev_mode");
    assert_eq!(
        err.source,
        ExtensionHookError::Config(ConfigError::ConfigurationConflict(KEY_DEV.to_string()))
    );
}

#[test]
fn repeated_configuration_dispatch_is_idempotent() {
    let mut registry = startup_registry();
    let mut schema = ArgSchema::new();
    registry
        .dispatch_argument_schema(&mut schema)
        .expect("schema dispatch");

    let mut config = RunConfig::new();
    config
        .set_text(KEY_REPORTER, REPORTER_DEFAULT)
        .expect("host default reporter");
    schema
        .parse_into(&["--dev"], &mut config)
        .expect("token parsing");

    registry
        .dispatch_configuration_ready(&mut config)
        .expect("first configuration dispatch");
    let after_first = (
        config.text(KEY_REPORTER).map(str::to_string),
        config.bool_or_default(KEY_DIAGNOSTICS),
    );

    registry
        .dispatch_configuration_ready(&mut config)
        .expect("second configuration dispatch");
    let after_second = (
        config.text(KEY_REPORTER).map(str::to_string),
        config.bool_or_default(KEY_DIAGNOSTICS),
    );

    assert_eq!(after_first, after_second);
    assert_eq!(config.text(KEY_REPORTER), Some(REPORTER_SILENT));
}

#[test]
fn registry_survives_two_runs_in_one_process() {
    let mut registry = startup_registry();

    for run in 0..2 {
        let mut schema = ArgSchema::new();
        registry
            .dispatch_argument_schema(&mut schema)
            .unwrap_or_else(|err| panic!("schema dispatch for run {run}: {err}"));

        let mut config = RunConfig::new();
        config
            .set_text(KEY_REPORTER, REPORTER_DEFAULT)
            .expect("host default reporter");
        schema
            .parse_into(&["--dev"], &mut config)
            .expect("token parsing");
        registry
            .dispatch_configuration_ready(&mut config)
            .expect("configuration dispatch");
        config.lock();

        assert_eq!(config.text(KEY_REPORTER), Some(REPORTER_SILENT));
        registry.dispatch_cleanup(&stepwise_core::RunReport::new());
    }
}
