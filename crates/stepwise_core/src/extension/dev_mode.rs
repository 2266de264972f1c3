//! Dev-mode extension: the `--dev` flag and its run-behavior overrides.
//!
//! # Responsibility
//! - Contribute exactly one flag, `--dev`, to the argument schema.
//! - When the flag is set, force the low-verbosity reporter and enable
//!   developer diagnostics before the configuration locks.
//!
//! # Invariants
//! - Inert by default: without `--dev` no configuration key is touched.
//! - A missing or mistyped `dev` key reads as `false`, never as a fault.
//! - Applying the override twice yields the same configuration as once.

use super::{Extension, HookResult};
use crate::config::{
    ArgSchema, RunConfig, KEY_DEV, KEY_DIAGNOSTICS, KEY_REPORTER, REPORTER_SILENT,
};
use log::info;

/// Stable id of the dev-mode extension.
pub const DEV_MODE_EXTENSION_ID: &str = "stepwise.dev_mode";

/// Extension gating dev-oriented run behavior behind `--dev`.
///
/// Participates in exactly two lifecycle phases and holds no state
/// between them; all run state lives in the host-owned configuration.
#[derive(Debug, Default)]
pub struct DevModeExtension;

impl DevModeExtension {
    pub fn new() -> Self {
        Self
    }
}

impl Extension for DevModeExtension {
    fn id(&self) -> &str {
        DEV_MODE_EXTENSION_ID
    }

    fn on_argument_schema(&mut self, schema: &mut ArgSchema) -> HookResult {
        schema.register_flag(KEY_DEV, "Enable dev mode")?;
        Ok(())
    }

    fn on_configuration_ready(&mut self, config: &mut RunConfig) -> HookResult {
        if !config.bool_or_default(KEY_DEV) {
            return Ok(());
        }

        config.set_text(KEY_REPORTER, REPORTER_SILENT)?;
        config.set_bool(KEY_DIAGNOSTICS, true)?;
        info!(
            "event=dev_mode_enabled module=extension status=ok reporter={REPORTER_SILENT} diagnostics=true"
        );
        Ok(())
    }
}
