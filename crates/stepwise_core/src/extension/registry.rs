//! In-process extension registry and per-phase dispatch.

use super::{Extension, ExtensionHealth, ExtensionHookError, ExtensionState};
use crate::config::{ArgSchema, RunConfig};
use crate::event::LifecyclePhase;
use crate::runner::{RunReport, ScenarioResult, StepResult};
use log::{error, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Registration and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidExtensionId(String),
    DuplicateExtensionId(String),
    ExtensionNotFound(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidExtensionId(value) => write!(f, "extension id is invalid: {value}"),
            Self::DuplicateExtensionId(value) => {
                write!(f, "extension id already registered: {value}")
            }
            Self::ExtensionNotFound(value) => write!(f, "extension not found: {value}"),
        }
    }
}

impl Error for RegistryError {}

/// Fatal startup-phase dispatch failure.
///
/// Raised when a hook fails during `ArgumentSchema` or
/// `ConfigurationReady`; the host refuses to proceed with the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchError {
    pub phase: LifecyclePhase,
    pub extension_id: String,
    pub source: ExtensionHookError,
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "extension `{}` failed at phase {}: {}",
            self.extension_id,
            self.phase.as_str(),
            self.source
        )
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

struct RegistryEntry {
    extension: Box<dyn Extension>,
    enabled: bool,
    state: ExtensionState,
    health: ExtensionHealth,
}

/// Explicit, process-wide list of active extensions.
///
/// The registry is passed by reference into the host's run wiring rather
/// than living behind ambient mutable state. Dispatch preserves
/// registration order; when several extensions write the same
/// configuration key, the last registered writer wins.
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: Vec<RegistryEntry>,
    index: BTreeMap<String, usize>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one extension, enabled by default.
    ///
    /// # Errors
    /// - `RegistryError::InvalidExtensionId` for ids outside the
    ///   `lowercase/digit` + `./_/-` separator format.
    /// - `RegistryError::DuplicateExtensionId` when the id is taken.
    pub fn register(&mut self, extension: Box<dyn Extension>) -> Result<(), RegistryError> {
        let id = extension.id().trim().to_string();
        if !is_valid_extension_id(&id) {
            return Err(RegistryError::InvalidExtensionId(id));
        }
        if self.index.contains_key(id.as_str()) {
            return Err(RegistryError::DuplicateExtensionId(id));
        }

        info!("event=extension_registered module=extension status=ok extension_id={id}");
        self.index.insert(id, self.entries.len());
        self.entries.push(RegistryEntry {
            extension,
            enabled: true,
            state: ExtensionState::Registered,
            health: ExtensionHealth::Healthy,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns registered extension ids in registration order.
    pub fn extension_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.extension.id())
            .collect()
    }

    /// Toggles one extension; disabled extensions are skipped by every
    /// dispatch. The toggle belongs to the host, never to the extension.
    pub fn set_enabled(&mut self, extension_id: &str, enabled: bool) -> Result<(), RegistryError> {
        let entry = self.entry_mut(extension_id)?;
        entry.enabled = enabled;
        Ok(())
    }

    pub fn is_enabled(&self, extension_id: &str) -> Option<bool> {
        self.entry(extension_id).map(|entry| entry.enabled)
    }

    pub fn state(&self, extension_id: &str) -> Option<ExtensionState> {
        self.entry(extension_id).map(|entry| entry.state)
    }

    pub fn health(&self, extension_id: &str) -> Option<ExtensionHealth> {
        self.entry(extension_id).map(|entry| entry.health)
    }

    /// Dispatches the argument-schema phase.
    ///
    /// # Errors
    /// - `DispatchError` on the first hook failure; flag-name conflicts
    ///   surface here and abort startup.
    pub fn dispatch_argument_schema(&mut self, schema: &mut ArgSchema) -> Result<(), DispatchError> {
        self.dispatch_startup(LifecyclePhase::ArgumentSchema, |extension| {
            extension.on_argument_schema(schema)
        })
    }

    /// Dispatches the configuration-ready phase and activates entries.
    ///
    /// The configuration must not be locked yet; this is the only phase
    /// in which extensions mutate it. When several extensions write the
    /// same key, the last registered writer wins.
    ///
    /// # Errors
    /// - `DispatchError` on the first hook failure; startup is aborted.
    pub fn dispatch_configuration_ready(
        &mut self,
        config: &mut RunConfig,
    ) -> Result<(), DispatchError> {
        self.dispatch_startup(LifecyclePhase::ConfigurationReady, |extension| {
            extension.on_configuration_ready(config)
        })?;
        for entry in self.entries.iter_mut().filter(|entry| entry.enabled) {
            entry.state = ExtensionState::Active;
        }
        Ok(())
    }

    pub fn dispatch_run_started(&mut self, config: &RunConfig) {
        self.dispatch_run(LifecyclePhase::RunStarted, |extension| {
            extension.on_run_started(config)
        });
    }

    pub fn dispatch_scenario_run(&mut self, scenario: &ScenarioResult) {
        self.dispatch_run(LifecyclePhase::ScenarioRun, |extension| {
            extension.on_scenario_run(scenario)
        });
    }

    pub fn dispatch_step_run(&mut self, step: &StepResult) {
        self.dispatch_run(LifecyclePhase::StepRun, |extension| {
            extension.on_step_run(step)
        });
    }

    pub fn dispatch_step_passed(&mut self, step: &StepResult) {
        self.dispatch_run(LifecyclePhase::StepPassed, |extension| {
            extension.on_step_passed(step)
        });
    }

    pub fn dispatch_step_failed(&mut self, step: &StepResult) {
        self.dispatch_run(LifecyclePhase::StepFailed, |extension| {
            extension.on_step_failed(step)
        });
    }

    pub fn dispatch_scenario_passed(&mut self, scenario: &ScenarioResult) {
        self.dispatch_run(LifecyclePhase::ScenarioPassed, |extension| {
            extension.on_scenario_passed(scenario)
        });
    }

    pub fn dispatch_scenario_failed(&mut self, scenario: &ScenarioResult) {
        self.dispatch_run(LifecyclePhase::ScenarioFailed, |extension| {
            extension.on_scenario_failed(scenario)
        });
    }

    pub fn dispatch_run_finished(&mut self, report: &RunReport) {
        self.dispatch_run(LifecyclePhase::RunFinished, |extension| {
            extension.on_run_finished(report)
        });
    }

    /// Dispatches cleanup and returns entries to `Registered` so the
    /// registry is ready for the next run in the same process.
    pub fn dispatch_cleanup(&mut self, report: &RunReport) {
        self.dispatch_run(LifecyclePhase::Cleanup, |extension| {
            extension.on_cleanup(report)
        });
        for entry in &mut self.entries {
            entry.state = ExtensionState::Registered;
        }
    }

    fn dispatch_startup<F>(
        &mut self,
        phase: LifecyclePhase,
        mut call: F,
    ) -> Result<(), DispatchError>
    where
        F: FnMut(&mut dyn Extension) -> Result<(), ExtensionHookError>,
    {
        for entry in self.entries.iter_mut().filter(|entry| entry.enabled) {
            if let Err(source) = call(entry.extension.as_mut()) {
                let extension_id = entry.extension.id().to_string();
                error!(
                    "event=extension_hook_failed module=extension status=error phase={} extension_id={extension_id} error={source}",
                    phase.as_str()
                );
                return Err(DispatchError {
                    phase,
                    extension_id,
                    source,
                });
            }
        }
        Ok(())
    }

    fn dispatch_run<F>(&mut self, phase: LifecyclePhase, mut call: F)
    where
        F: FnMut(&mut dyn Extension) -> Result<(), ExtensionHookError>,
    {
        for entry in self.entries.iter_mut().filter(|entry| entry.enabled) {
            if let Err(err) = call(entry.extension.as_mut()) {
                entry.health = ExtensionHealth::Degraded;
                error!(
                    "event=extension_hook_failed module=extension status=error phase={} extension_id={} error={err}",
                    phase.as_str(),
                    entry.extension.id()
                );
            }
        }
    }

    fn entry(&self, extension_id: &str) -> Option<&RegistryEntry> {
        self.index
            .get(extension_id.trim())
            .and_then(|position| self.entries.get(*position))
    }

    fn entry_mut(&mut self, extension_id: &str) -> Result<&mut RegistryEntry, RegistryError> {
        let normalized = extension_id.trim();
        match self.index.get(normalized) {
            Some(position) => Ok(&mut self.entries[*position]),
            None => Err(RegistryError::ExtensionNotFound(normalized.to_string())),
        }
    }
}

fn is_valid_extension_id(value: &str) -> bool {
    let mut chars = value.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !first.is_ascii_lowercase() && !first.is_ascii_digit() {
        return false;
    }

    let mut prev_separator = false;
    for c in chars {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            prev_separator = false;
            continue;
        }
        if c == '.' || c == '_' || c == '-' {
            if prev_separator {
                return false;
            }
            prev_separator = true;
            continue;
        }
        return false;
    }
    !prev_separator
}
