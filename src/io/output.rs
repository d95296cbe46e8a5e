use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{MetricSeries, TaskFailure};
use crate::stats::MetricCorrelation;

/// Label of the quality axis in reports
pub const QUALITY_LABEL: &str = "COMET Score";

/// Summary of one extraction run
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationReport {
    pub run_id: String,
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub input_dir: String,
    pub records_succeeded: usize,
    pub records_failed: usize,
    pub failures: Vec<TaskFailure>,
    pub correlations: Vec<MetricCorrelation>,
}

impl CorrelationReport {
    pub fn new(
        input_dir: &Path,
        series: &MetricSeries,
        failures: Vec<TaskFailure>,
        correlations: Vec<MetricCorrelation>,
    ) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            input_dir: input_dir.to_string_lossy().into_owned(),
            records_succeeded: series.len(),
            records_failed: failures.len(),
            failures,
            correlations,
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_json(self, path)
    }
}

/// Write the aligned series to a JSON file
pub fn write_series_json(series: &MetricSeries, path: &Path) -> Result<()> {
    write_json(series, path)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

/// Format correlations as a plain-text table
pub fn format_correlations(correlations: &[MetricCorrelation]) -> String {
    let width = correlations
        .iter()
        .map(|c| c.metric.len())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for c in correlations {
        let line = match &c.correlation {
            Some(stats) => format!(
                "{:<width$}  r = {:>7.4}  p = {:.4e}  n = {}",
                c.metric,
                stats.r,
                stats.p_value,
                stats.n,
                width = width
            ),
            None => format!("{:<width$}  undefined", c.metric, width = width),
        };
        output.push_str(&line);
        output.push('\n');
    }
    output
}
