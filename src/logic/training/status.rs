//! Training Status - observable state of the retrain lifecycle
//!
//! Idle → Running → Succeeded | Aborted → Running → ...

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingState {
    Idle,
    Running,
    Succeeded,
    Aborted,
}

/// What asked for a retrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrainTrigger {
    /// Explicit operator/caller request
    Manual,
    /// Pending vector count crossed the configured threshold
    Threshold,
    /// Periodic scheduler tick (count trigger checked on a timer)
    Scheduled,
}

/// Result of a retrain request that did not fail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RetrainOutcome {
    Published { version: String, samples: usize },
    /// Coalesced into the run already in progress
    AlreadyTraining,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStatus {
    pub state: TrainingState,
    pub last_trigger: Option<RetrainTrigger>,
    pub last_started: Option<DateTime<Utc>>,
    pub last_finished: Option<DateTime<Utc>>,
    /// Version published by the last successful run
    pub last_version: Option<String>,
    pub last_error: Option<String>,
    pub last_error_kind: Option<ErrorKind>,
    pub runs: u64,
    pub failures: u64,
    /// Vectors recorded since the last successful publish
    pub pending: usize,
    pub buffered: usize,
}

impl Default for TrainingStatus {
    fn default() -> Self {
        Self {
            state: TrainingState::Idle,
            last_trigger: None,
            last_started: None,
            last_finished: None,
            last_version: None,
            last_error: None,
            last_error_kind: None,
            runs: 0,
            failures: 0,
            pending: 0,
            buffered: 0,
        }
    }
}

impl TrainingStatus {
    pub fn is_running(&self) -> bool {
        self.state == TrainingState::Running
    }

    pub(crate) fn start(&mut self, trigger: RetrainTrigger) {
        self.state = TrainingState::Running;
        self.last_trigger = Some(trigger);
        self.last_started = Some(Utc::now());
        self.runs += 1;
    }

    pub(crate) fn succeed(&mut self, version: &str) {
        self.state = TrainingState::Succeeded;
        self.last_finished = Some(Utc::now());
        self.last_version = Some(version.to_string());
        self.last_error = None;
        self.last_error_kind = None;
    }

    pub(crate) fn abort(&mut self, kind: ErrorKind, message: String) {
        self.state = TrainingState::Aborted;
        self.last_finished = Some(Utc::now());
        self.last_error = Some(message);
        self.last_error_kind = Some(kind);
        self.failures += 1;
    }
}
