//! Run session state
//!
//! One `RunSession` exists per operator context and is passed explicitly to
//! the orchestrator. Only the orchestrator drives the Idle → Running →
//! Completed | Failed transitions; the operator may reset a finished session.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RunConfiguration;
use crate::error::{ScrimError, ScrimResult};

/// Lifecycle state of a run session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Failed,
}

impl RunState {
    /// Whether the session has reached a terminal state
    pub fn is_finished(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The live session of one operator context
#[derive(Debug, Clone)]
pub struct RunSession {
    state: RunState,
    config: Option<Arc<RunConfiguration>>,
    output_path: Option<PathBuf>,
    error: Option<String>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Default for RunSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSession {
    /// Fresh session in the Idle state
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            config: None,
            output_path: None,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> Option<&RunConfiguration> {
        self.config.as_deref()
    }

    /// Root for results lookup, set only once a run has completed
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Error text of a failed run
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The failure of a failed run as an error value
    pub fn failure(&self) -> Option<ScrimError> {
        self.error.clone().map(ScrimError::ExecutorFailure)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Wall-clock duration of the last run, once it has finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.finished_at? - self.started_at?)
    }

    /// Return a finished session to Idle, dropping its results
    pub fn reset(&mut self) -> ScrimResult<()> {
        if !self.state.is_finished() {
            return Err(ScrimError::InvalidState {
                state: self.state.to_string(),
            });
        }
        *self = Self::new();
        Ok(())
    }

    pub(crate) fn begin(&mut self, config: RunConfiguration) -> ScrimResult<Arc<RunConfiguration>> {
        if self.state != RunState::Idle {
            return Err(ScrimError::InvalidState {
                state: self.state.to_string(),
            });
        }
        let config = Arc::new(config);
        self.state = RunState::Running;
        self.config = Some(Arc::clone(&config));
        self.output_path = None;
        self.error = None;
        self.started_at = Some(Utc::now());
        self.finished_at = None;
        Ok(config)
    }

    pub(crate) fn complete(&mut self, output_path: PathBuf) {
        debug_assert_eq!(self.state, RunState::Running);
        self.state = RunState::Completed;
        self.output_path = Some(output_path);
        self.finished_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, error: String) {
        debug_assert_eq!(self.state, RunState::Running);
        self.state = RunState::Failed;
        self.error = Some(error);
        self.finished_at = Some(Utc::now());
    }
}
