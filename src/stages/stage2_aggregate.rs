use tracing::{info, warn};

use crate::io::QUALITY_LABEL;
use crate::models::{BatchOutcome, MetricSeries};
use crate::stats::{correlation_report, MetricCorrelation};

/// Result of Stage 2 aggregation
#[derive(Debug, Clone)]
pub struct Stage2Result {
    /// Aligned series over the successful records
    pub series: MetricSeries,
    /// Each metric correlated against the quality score
    pub correlations: Vec<MetricCorrelation>,
}

/// Execute Stage 2: aggregate successes and correlate
///
/// Failures are only summarized; they never stop aggregation over the
/// records that did succeed.
pub fn execute_stage2(outcome: &BatchOutcome) -> Stage2Result {
    let failed = outcome.failure_count();
    if failed > 0 {
        warn!("{} of {} records failed:", failed, outcome.results.len());
        for failure in outcome.failures() {
            warn!("  {} - {}", failure.file, failure.error);
        }
    }

    let series = outcome.series();
    info!("Stage 2: aggregating {} records", series.len());

    let correlations = correlation_report(&series);
    for c in &correlations {
        match &c.correlation {
            Some(stats) => info!(
                "Correlation between {} and {}: r={:.4}, p={:.4e} (n={})",
                c.metric, QUALITY_LABEL, stats.r, stats.p_value, stats.n
            ),
            None => info!(
                "Correlation between {} and {}: undefined (n={})",
                c.metric,
                QUALITY_LABEL,
                series.len()
            ),
        }
    }

    Stage2Result {
        series,
        correlations,
    }
}
