use std::fmt;

use serde::{Deserialize, Serialize};

use super::MetricSet;
use crate::error::ExtractError;

/// Lifecycle of a single record task. No retries: a failure is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Metrics extracted from one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub file: String,
    pub quality: f64,
    pub metrics: MetricSet,
}

/// Why a record could not be processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub file: String,
    /// `"<Class>: <message>"`
    pub error: String,
    /// Bounded chain of underlying causes
    pub trace: Vec<String>,
}

impl TaskFailure {
    pub fn from_error(file: impl Into<String>, err: &ExtractError) -> Self {
        Self {
            file: file.into(),
            error: err.describe(),
            trace: err.trace(),
        }
    }
}

/// Outcome of one record task; exactly one per discovered file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskResult {
    Success(MetricRecord),
    Failure(TaskFailure),
}

impl TaskResult {
    pub fn file(&self) -> &str {
        match self {
            TaskResult::Success(r) => &r.file,
            TaskResult::Failure(f) => &f.file,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskResult::Success(_))
    }

    pub fn state(&self) -> TaskState {
        match self {
            TaskResult::Success(_) => TaskState::Succeeded,
            TaskResult::Failure(_) => TaskState::Failed,
        }
    }
}
