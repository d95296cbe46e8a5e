use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::error::ExtractResult;
use crate::io::{discover_record_files, file_id, parse_record_file, read_quality_score};
use crate::models::{Record, TaskFailure, TurnSequence};

/// A parsed record with its reconstructed turn sequence
#[derive(Debug, Clone)]
pub struct LoadedRecord {
    pub record: Record,
    pub turns: TurnSequence,
}

/// Stage 0: parse a record file and rebuild its turn sequence
pub fn load_record(path: &Path) -> ExtractResult<LoadedRecord> {
    let record = parse_record_file(path)?;
    let turns = TurnSequence::from_record(&record)?;
    Ok(LoadedRecord { record, turns })
}

/// Quality scores of every record file in a directory
#[derive(Debug, Clone, Default)]
pub struct QualityScores {
    pub scores: Vec<f64>,
    pub failures: Vec<TaskFailure>,
}

/// Read only the quality score of each record file in `input_dir`.
/// Unreadable files are reported and skipped.
pub fn collect_quality_scores(input_dir: &Path) -> Result<QualityScores> {
    let mut collected = QualityScores::default();
    for path in discover_record_files(input_dir)? {
        let file = file_id(&path);
        info!("Processing {}", file);
        match read_quality_score(&path) {
            Ok(score) => collected.scores.push(score),
            Err(e) => {
                warn!("FAILED: {} - {}", file, e.describe());
                collected.failures.push(TaskFailure::from_error(file, &e));
            }
        }
    }
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Side;

    #[test]
    fn test_load_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debate_1.json");
        let debate = serde_json::json!({
            "players": {
                "Affirmative side": (0..6).map(|i| serde_json::json!({"content": format!("a{}", i)})).collect::<Vec<_>>(),
                "Negative side": (0..4).map(|i| serde_json::json!({"content": format!("n{}", i)})).collect::<Vec<_>>(),
            },
            "comet score": 0.91
        });
        std::fs::write(&path, debate.to_string()).unwrap();

        let loaded = load_record(&path).unwrap();
        assert_eq!(loaded.record.file_id, "debate_1.json");
        assert_eq!(loaded.record.quality, 0.91);
        assert_eq!(loaded.turns.len(), 3);
        assert_eq!(loaded.turns.turns[0].utterance, "a5");
        assert_eq!(loaded.turns.turns[2].speaker, Side::Affirmative);
    }

    #[test]
    fn test_load_record_short_affirmative_side() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.json");
        std::fs::write(
            &path,
            r#"{"players": {"Affirmative side": [{"content": "a0"}], "Negative side": []}, "comet score": 0.1}"#,
        )
        .unwrap();

        let err = load_record(&path).unwrap_err();
        assert_eq!(err.class(), "ParseError");
    }

    #[test]
    fn test_collect_quality_scores_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"comet score": 0.25}"#).unwrap();
        std::fs::write(dir.path().join("b.json"), r#"{"comet score": 0.75}"#).unwrap();
        std::fs::write(dir.path().join("c.json"), "not json").unwrap();

        let collected = collect_quality_scores(dir.path()).unwrap();
        assert_eq!(collected.scores, vec![0.25, 0.75]);
        assert_eq!(collected.failures.len(), 1);
        assert_eq!(collected.failures[0].file, "c.json");
    }
}
