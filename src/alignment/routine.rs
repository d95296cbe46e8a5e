use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::models::AlignmentOutput;

/// Environment variable naming the alignment program
pub const PROGRAM_ENV_VAR: &str = "DIALIGN_PROGRAM";

const DEFAULT_PROGRAM: &str = "dialign";

/// Computes lexical-alignment metrics for a turn table.
///
/// Implementations are called from blocking worker threads, one call per
/// record, and must not share per-call state.
pub trait AlignmentRoutine: Send + Sync {
    fn align(
        &self,
        table: &Path,
        speaker_column: &str,
        utterance_column: &str,
    ) -> ExtractResult<AlignmentOutput>;
}

/// Configuration for the external alignment command
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentConfig {
    /// Program to run
    pub program: String,
    /// Arguments placed before the table path and column labels
    pub args: Vec<String>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: Vec::new(),
        }
    }
}

impl AlignmentConfig {
    /// Default config, with the program taken from `DIALIGN_PROGRAM` if set
    pub fn from_env() -> Self {
        let program = std::env::var(PROGRAM_ENV_VAR)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROGRAM.to_string());
        Self {
            program,
            ..Default::default()
        }
    }

    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// Runs dialign as a subprocess and decodes the JSON it prints on stdout
#[derive(Debug, Clone)]
pub struct DialignCommand {
    config: AlignmentConfig,
}

impl DialignCommand {
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    fn arguments(&self, table: &Path, speaker_column: &str, utterance_column: &str) -> Vec<String> {
        let mut args = self.config.args.clone();
        args.push(table.to_string_lossy().into_owned());
        args.push(speaker_column.to_string());
        args.push(utterance_column.to_string());
        args
    }
}

impl AlignmentRoutine for DialignCommand {
    fn align(
        &self,
        table: &Path,
        speaker_column: &str,
        utterance_column: &str,
    ) -> ExtractResult<AlignmentOutput> {
        let args = self.arguments(table, speaker_column, utterance_column);
        let rendered = format!("{} {}", self.config.program, args.join(" "));
        debug!("Running {}", rendered);

        let output = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ExtractError::CommandMissing {
                    command: self.config.program.clone(),
                },
                _ => ExtractError::Routine(format!("failed to spawn `{}`: {}", rendered, e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::from_command_failure(
                rendered,
                output.status.code().unwrap_or(-1),
                &stderr,
            ));
        }

        serde_json::from_slice(&output.stdout).map_err(ExtractError::BadOutput)
    }
}
