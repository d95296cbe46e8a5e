use serde::{Deserialize, Serialize};

use super::{MetricRecord, TaskFailure, TaskResult};

/// Index-aligned metric columns; element `i` of every vector comes from `files[i]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub files: Vec<String>,
    pub quality: Vec<f64>,
    pub er: Vec<f64>,
    pub ee: Vec<f64>,
    pub affirmative_er: Vec<f64>,
    pub negative_er: Vec<f64>,
    pub affirmative_ee: Vec<f64>,
    pub negative_ee: Vec<f64>,
    pub affirmative_initiated: Vec<f64>,
    pub negative_initiated: Vec<f64>,
}

impl MetricSeries {
    pub fn push(&mut self, record: &MetricRecord) {
        let m = &record.metrics;
        self.files.push(record.file.clone());
        self.quality.push(record.quality);
        self.er.push(m.er);
        self.ee.push(m.ee);
        self.affirmative_er.push(m.affirmative.er);
        self.negative_er.push(m.negative.er);
        self.affirmative_ee.push(m.affirmative.ee);
        self.negative_ee.push(m.negative.ee);
        self.affirmative_initiated.push(m.affirmative.initiated);
        self.negative_initiated.push(m.negative.initiated);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Metric columns paired with the axis label used in reports
    pub fn metric_columns(&self) -> [(&'static str, &[f64]); 8] {
        [
            ("ER", self.er.as_slice()),
            ("EE", self.ee.as_slice()),
            ("Affirmative Repetitions", self.affirmative_er.as_slice()),
            ("Negative Repetitions", self.negative_er.as_slice()),
            ("Affirmative Establishments", self.affirmative_ee.as_slice()),
            ("Negative Establishments", self.negative_ee.as_slice()),
            ("Affirmative Initiated", self.affirmative_initiated.as_slice()),
            ("Negative Initiated", self.negative_initiated.as_slice()),
        ]
    }
}

impl<'a> FromIterator<&'a MetricRecord> for MetricSeries {
    fn from_iter<I: IntoIterator<Item = &'a MetricRecord>>(iter: I) -> Self {
        let mut series = MetricSeries::default();
        for record in iter {
            series.push(record);
        }
        series
    }
}

/// All results of one batch run, in completion order
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub results: Vec<TaskResult>,
}

impl BatchOutcome {
    pub fn successes(&self) -> impl Iterator<Item = &MetricRecord> {
        self.results.iter().filter_map(|r| match r {
            TaskResult::Success(s) => Some(s),
            TaskResult::Failure(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskFailure> {
        self.results.iter().filter_map(|r| match r {
            TaskResult::Failure(f) => Some(f),
            TaskResult::Success(_) => None,
        })
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Series over the successful records only
    pub fn series(&self) -> MetricSeries {
        self.successes().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricSet, SpeakerMetrics};

    fn success(file: &str, quality: f64, er: f64) -> TaskResult {
        let speaker = SpeakerMetrics {
            er,
            ee: er / 2.0,
            initiated: 1.0 - er,
        };
        TaskResult::Success(MetricRecord {
            file: file.to_string(),
            quality,
            metrics: MetricSet {
                er,
                ee: er * 2.0,
                affirmative: speaker,
                negative: speaker,
            },
        })
    }

    #[test]
    fn test_series_skips_failures_and_stays_aligned() {
        let outcome = BatchOutcome {
            results: vec![
                success("b.json", 0.7, 0.2),
                TaskResult::Failure(TaskFailure {
                    file: "bad.json".into(),
                    error: "ParseError: JSONDecodeError: EOF".into(),
                    trace: vec![],
                }),
                success("a.json", 0.9, 0.4),
            ],
        };

        let series = outcome.series();
        assert_eq!(outcome.success_count(), 2);
        assert_eq!(outcome.failure_count(), 1);
        assert_eq!(series.len(), 2);
        assert_eq!(series.files, vec!["b.json", "a.json"]);
        assert_eq!(series.quality, vec![0.7, 0.9]);
        assert_eq!(series.er, vec![0.2, 0.4]);
        for (_, column) in series.metric_columns() {
            assert_eq!(column.len(), series.len());
        }
    }
}
