use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

pub type ExtractResult<T> = Result<T, ExtractError>;

/// Maximum number of source-chain messages kept in a failure trace
pub const MAX_TRACE_DEPTH: usize = 3;

/// Everything that can go wrong while processing a single record file
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSONDecodeError: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("missing command `{command}`")]
    CommandMissing { command: String },

    #[error("command failed: `{command}` (status: {status}){stderr_suffix}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr_suffix: String,
    },

    #[error("undecodable alignment output: {0}")]
    BadOutput(#[source] serde_json::Error),

    #[error("alignment output has no metric `{0}`")]
    MissingMetric(String),

    #[error("alignment routine failed: {0}")]
    Routine(String),

    #[error("temporary turn table: {0}")]
    Resource(#[source] std::io::Error),
}

impl ExtractError {
    pub fn from_command_failure(command: String, status: i32, stderr: &str) -> Self {
        let trimmed = stderr.trim();
        let stderr_suffix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("; stderr: {trimmed}")
        };
        Self::CommandFailed {
            command,
            status,
            stderr_suffix,
        }
    }

    /// Error class used in failure descriptions
    pub fn class(&self) -> &'static str {
        match self {
            Self::Io { .. } | Self::Json(_) | Self::MissingField(_) => "ParseError",
            Self::CommandMissing { .. }
            | Self::CommandFailed { .. }
            | Self::BadOutput(_)
            | Self::MissingMetric(_)
            | Self::Routine(_) => "ExternalRoutineError",
            Self::Resource(_) => "ResourceError",
        }
    }

    /// `"<Class>: <message>"`
    pub fn describe(&self) -> String {
        format!("{}: {}", self.class(), self)
    }

    /// The error followed by its sources, at most [`MAX_TRACE_DEPTH`] entries
    pub fn trace(&self) -> Vec<String> {
        let mut trace = Vec::new();
        let mut current: Option<&dyn StdError> = Some(self);
        while let Some(err) = current {
            if trace.len() == MAX_TRACE_DEPTH {
                break;
            }
            trace.push(err.to_string());
            current = err.source();
        }
        trace
    }
}
