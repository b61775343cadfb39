//! Run-scoped pipeline state
//!
//! Each workflow owns one `PipelineStatus`: the state machine position plus
//! everything the front end derives from it (the single error surface, the
//! field faults of the last validation, the last success notice).

use serde::{Deserialize, Serialize};

use crate::workflow::ValidationResult;

/// Position of a workflow's pipeline
///
/// ```text
/// idle -> running -> succeeded
///            \-----> failed
/// succeeded/failed -> running  (next validated trigger)
/// succeeded/failed -> idle     (explicit reset)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Succeeded | PipelineState::Failed)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PipelineState::Idle => "idle",
            PipelineState::Running => "running",
            PipelineState::Succeeded => "succeeded",
            PipelineState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Snapshot of everything a front end renders for one workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub state: PipelineState,

    /// The single aggregate error surface
    pub error: Option<String>,

    /// Faults from the most recent validation
    pub faults: ValidationResult,

    /// Success notice of the last completed run
    pub notice: Option<String>,

    /// Stages completed in the current or last run, in order
    pub completed_stages: Vec<String>,

    /// Id of the current or last run
    pub run_id: Option<String>,
}

impl PipelineStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the triggering control should accept input
    pub fn trigger_enabled(&self) -> bool {
        self.state != PipelineState::Running
    }

    /// Return to idle, dropping the error surface, faults and notice
    pub fn clear(&mut self) {
        self.state = PipelineState::Idle;
        self.error = None;
        self.faults = ValidationResult::default();
        self.notice = None;
        self.completed_stages.clear();
    }
}
