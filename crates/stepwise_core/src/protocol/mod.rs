//! Dev-console state protocol.
//!
//! # Responsibility
//! - Define the actions a dev console issues between steps and the
//!   serializable state snapshots published back to it.
//! - Keep the console transport behind a synchronous sink contract.
//!
//! # Invariants
//! - Snapshots list steps sorted by declared index.
//! - Publishing a snapshot never blocks; transports that need I/O live
//!   behind the `DevConsole` seam, outside this core.

use crate::runner::ScenarioId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Mutex;

pub mod session;

pub use session::{DevSession, SessionError, SessionTrackerExtension};

/// Action a dev console issues between steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ControlAction {
    /// Re-run one step by name.
    RunSpecificStep { step: String },
    /// Run the named steps in declared order, then end the scenario.
    RunToStep { steps: BTreeSet<String> },
    /// Run the named step, or the scenario's first step when `None`.
    RunNextStep { step: Option<String> },
    /// Publish the current state snapshot without scheduling anything.
    UpdateState,
}

/// Console-visible status of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Passed,
    Failed,
}

/// Console-visible identity of the active scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioInfo {
    pub unique_id: ScenarioId,
    pub subject: String,
    pub rel_path: String,
}

/// Console-visible step table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Declared position of the step within its scenario.
    pub index: u32,
    pub name: String,
    pub status: StepStatus,
}

/// Full console state published at every status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub scenario: ScenarioInfo,
    /// Steps sorted by `index`.
    pub steps: Vec<StepInfo>,
}

/// Synchronous sink for state snapshots.
///
/// This is the seam a real transport (socket server, IDE bridge) would
/// implement outside the core; implementations must return promptly.
pub trait DevConsole {
    fn state_changed(&self, snapshot: &StateSnapshot);
}

/// In-memory console retaining every published snapshot.
///
/// Serves tests and the CLI probe; shared via `Arc` so callers keep a
/// handle for inspection after the session takes ownership of a clone.
#[derive(Debug, Default)]
pub struct RecordingConsole {
    snapshots: Mutex<Vec<StateSnapshot>>,
}

impl RecordingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all published snapshots in publish order.
    pub fn snapshots(&self) -> Vec<StateSnapshot> {
        match self.snapshots.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the most recent snapshot.
    pub fn last(&self) -> Option<StateSnapshot> {
        self.snapshots().pop()
    }
}

impl DevConsole for RecordingConsole {
    fn state_changed(&self, snapshot: &StateSnapshot) {
        let mut guard = match self.snapshots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(snapshot.clone());
    }
}
