//! Run state: progress of one demo run, owned by whoever started it.
//!
//! RULE: There is no process-wide status. Each caller holds its own
//! RunState and passes it explicitly to the pipeline.
//! A result is only ever set from a complete batch.

use crate::{
    error::{PipelineError, PipelineResult},
    model::SimulationBatch,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunState {
    pub status:       RunStatus,
    /// Percent complete, 0–100. Never decreases while running.
    pub progress:     u8,
    pub current_step: String,
    pub result:       Option<SimulationBatch>,
    pub error:        Option<String>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        Self {
            status:       RunStatus::Idle,
            progress:     0,
            current_step: String::new(),
            result:       None,
            error:        None,
        }
    }

    /// Begin a run, clearing any previous result or error.
    pub fn start(&mut self, step: impl Into<String>) -> PipelineResult<()> {
        if self.is_running() {
            return Err(PipelineError::RunAlreadyActive);
        }
        *self = Self {
            status:       RunStatus::Running,
            progress:     0,
            current_step: step.into(),
            result:       None,
            error:        None,
        };
        Ok(())
    }

    /// Record a new step. Progress is clamped to 0–100 and never moves
    /// backwards. Ignored unless running.
    pub fn advance(&mut self, progress: u8, step: impl Into<String>) {
        if !self.is_running() {
            return;
        }
        self.progress = progress.min(100).max(self.progress);
        self.current_step = step.into();
    }

    pub fn complete(&mut self, batch: SimulationBatch) {
        self.status = RunStatus::Completed;
        self.progress = 100;
        self.current_step = "Complete".to_string();
        self.result = Some(batch);
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.progress = 0;
        self.result = None;
        self.error = Some(message.into());
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    pub fn result(&self) -> Option<&SimulationBatch> {
        self.result.as_ref()
    }
}
