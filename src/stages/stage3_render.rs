use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::io::{write_series_json, CorrelationReport};
use crate::models::MetricSeries;

/// Result of Stage 3 rendering
#[derive(Debug, Default)]
pub struct Stage3Result {
    /// Path to the series file (if written)
    pub series_path: Option<PathBuf>,
    /// Path to the report file (if written)
    pub report_path: Option<PathBuf>,
}

/// Execute Stage 3: Rendering
///
/// Produces up to two files:
/// 1. Series: the index-aligned metric columns, for external plotting
/// 2. Report: run summary with failures and correlations
pub fn execute_stage3(
    series: &MetricSeries,
    report: &CorrelationReport,
    series_output: Option<&Path>,
    report_output: Option<&Path>,
) -> Result<Stage3Result> {
    let mut result = Stage3Result::default();

    if let Some(path) = series_output {
        info!("Writing metric series to {:?}", path);
        write_series_json(series, path)?;
        result.series_path = Some(path.to_path_buf());
    }

    if let Some(path) = report_output {
        info!("Writing correlation report to {:?}", path);
        report.write_json(path)?;
        result.report_path = Some(path.to_path_buf());
    }

    Ok(result)
}
