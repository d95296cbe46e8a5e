use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Side;
use crate::error::{ExtractError, ExtractResult};

/// Key of the expression-repetition metric in routine output
pub const KEY_REPETITION: &str = "ER";
/// Key of the expression-establishment metric in routine output
pub const KEY_ESTABLISHMENT: &str = "EE";
/// Key of the initiated-expressions metric in routine output
pub const KEY_INITIATED: &str = "Initiated";

/// Decoded output of one alignment routine invocation
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AlignmentOutput {
    /// Global metrics (ER, EE, ...)
    pub speaker_independent: BTreeMap<String, Value>,
    /// Per-speaker metrics keyed by speaker label
    pub speaker_dependent: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    pub shared_expressions: Value,
    #[serde(default)]
    pub self_repetitions: Value,
    #[serde(default)]
    pub online_metrics: Value,
}

impl AlignmentOutput {
    /// Pull out the metrics used downstream
    pub fn metric_set(&self) -> ExtractResult<MetricSet> {
        Ok(MetricSet {
            er: number(&self.speaker_independent, KEY_REPETITION, "speaker_independent")?,
            ee: number(&self.speaker_independent, KEY_ESTABLISHMENT, "speaker_independent")?,
            affirmative: self.speaker_metrics(Side::Affirmative)?,
            negative: self.speaker_metrics(Side::Negative)?,
        })
    }

    fn speaker_metrics(&self, side: Side) -> ExtractResult<SpeakerMetrics> {
        let label = side.label();
        let metrics = self.speaker_dependent.get(label).ok_or_else(|| {
            ExtractError::MissingMetric(format!("speaker_dependent.{}", label))
        })?;
        let path = format!("speaker_dependent.{}", label);
        Ok(SpeakerMetrics {
            er: number(metrics, KEY_REPETITION, &path)?,
            ee: number(metrics, KEY_ESTABLISHMENT, &path)?,
            initiated: number(metrics, KEY_INITIATED, &path)?,
        })
    }
}

fn number(map: &BTreeMap<String, Value>, key: &str, path: &str) -> ExtractResult<f64> {
    map.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ExtractError::MissingMetric(format!("{}.{}", path, key)))
}

/// Per-speaker alignment metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeakerMetrics {
    pub er: f64,
    pub ee: f64,
    pub initiated: f64,
}

/// Metrics kept for one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// Expression repetition, speaker independent
    pub er: f64,
    /// Expression establishment, speaker independent
    pub ee: f64,
    pub affirmative: SpeakerMetrics,
    pub negative: SpeakerMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"{
        "speaker_independent": {"ER": 0.42, "EE": 0.17, "Num. utterances": 9},
        "speaker_dependent": {
            "Affirmative side": {"ER": 0.3, "EE": 0.1, "Initiated": 0.6},
            "Negative side": {"ER": 0.5, "EE": 0.2, "Initiated": 0.4}
        },
        "shared_expressions": [{"expression": "the policy", "freq": 3}]
    }"#;

    #[test]
    fn test_metric_set_from_output() {
        let output: AlignmentOutput = serde_json::from_str(OUTPUT).unwrap();
        let metrics = output.metric_set().unwrap();

        assert_eq!(metrics.er, 0.42);
        assert_eq!(metrics.ee, 0.17);
        assert_eq!(metrics.affirmative.initiated, 0.6);
        assert_eq!(metrics.negative.er, 0.5);
        assert!(output.self_repetitions.is_null());
    }

    #[test]
    fn test_missing_speaker_metric() {
        let mut output: AlignmentOutput = serde_json::from_str(OUTPUT).unwrap();
        output
            .speaker_dependent
            .get_mut("Negative side")
            .unwrap()
            .remove("Initiated");

        let err = output.metric_set().unwrap_err();
        assert_eq!(
            err.to_string(),
            "alignment output has no metric `speaker_dependent.Negative side.Initiated`"
        );
    }

    #[test]
    fn test_missing_speaker() {
        let mut output: AlignmentOutput = serde_json::from_str(OUTPUT).unwrap();
        output.speaker_dependent.remove("Affirmative side");
        assert!(matches!(
            output.metric_set(),
            Err(ExtractError::MissingMetric(_))
        ));
    }
}
