use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::alignment::AlignmentRoutine;
use crate::error::ExtractResult;
use crate::io::{discover_record_files, file_id, TurnTable, SPEAKER_COLUMN, UTTERANCE_COLUMN};
use crate::models::{BatchOutcome, MetricRecord, TaskFailure, TaskResult, TaskState};
use crate::stages::load_record;

/// Configuration for the batch metric extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Maximum number of records processed at once
    pub workers: usize,
    /// Directory for temporary turn tables (system temp dir when `None`)
    pub temp_dir: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            temp_dir: None,
        }
    }
}

/// Stage 1: extract alignment metrics for every record file in `input_dir`
///
/// Each file is processed independently on a bounded pool:
/// 1. Parse the record and rebuild its turn sequence
/// 2. Write the turns to a temporary table
/// 3. Run the alignment routine on the table
/// 4. Keep the metrics, or record why the file failed
///
/// Only a failure to list the directory is returned as an error; every
/// per-file problem ends up as a [`TaskResult::Failure`].
pub async fn execute_stage1(
    input_dir: &Path,
    routine: Arc<dyn AlignmentRoutine>,
    config: &ExtractorConfig,
) -> Result<BatchOutcome> {
    let files = discover_record_files(input_dir)?;
    info!(
        "Stage 1: Processing {} record files with {} workers",
        files.len(),
        config.workers.max(1)
    );
    Ok(extract_files(files, routine, config).await)
}

/// Run one task per file and collect the results as they complete
pub async fn extract_files(
    files: Vec<PathBuf>,
    routine: Arc<dyn AlignmentRoutine>,
    config: &ExtractorConfig,
) -> BatchOutcome {
    let semaphore = Arc::new(Semaphore::new(config.workers.max(1)));
    let mut tasks = JoinSet::new();
    let mut pending: HashSet<String> = HashSet::with_capacity(files.len());

    for path in files {
        let file = file_id(&path);
        debug!("{}: {}", file, TaskState::Pending);
        pending.insert(file.clone());

        let semaphore = Arc::clone(&semaphore);
        let routine = Arc::clone(&routine);
        let task_config = config.clone();

        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return failure(file, format!("ResourceError: worker pool closed: {}", e)),
            };

            let handle = tokio::task::spawn_blocking(move || {
                process_record(&path, routine.as_ref(), &task_config)
            });
            match handle.await {
                Ok(result) => result,
                Err(e) => failure(file, describe_join_error(e)),
            }
        });
    }

    let mut results = Vec::with_capacity(pending.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => {
                match &result {
                    TaskResult::Success(r) => info!("Processed: {}", r.file),
                    TaskResult::Failure(f) => warn!("FAILED: {} - {}", f.file, f.error),
                }
                pending.remove(result.file());
                results.push(result);
            }
            Err(e) => error!("Worker task ended without a result: {}", e),
        }
    }

    // Anything still pending lost its task without reporting back
    for file in pending {
        warn!("FAILED: {} - task ended without a result", file);
        results.push(failure(
            file,
            "ResourceError: task ended without a result".to_string(),
        ));
    }

    let outcome = BatchOutcome { results };
    info!(
        "Stage 1: {} succeeded, {} failed",
        outcome.success_count(),
        outcome.failure_count()
    );
    outcome
}

/// Process a single record file. Never panics on bad input; every error
/// becomes a failure result for this file.
pub fn process_record(
    path: &Path,
    routine: &dyn AlignmentRoutine,
    config: &ExtractorConfig,
) -> TaskResult {
    let file = file_id(path);
    debug!("{}: {}", file, TaskState::Running);

    let result = match extract_metrics(path, routine, config) {
        Ok(record) => TaskResult::Success(record),
        Err(e) => TaskResult::Failure(TaskFailure::from_error(file, &e)),
    };
    debug!("{}: {}", result.file(), result.state());
    result
}

fn extract_metrics(
    path: &Path,
    routine: &dyn AlignmentRoutine,
    config: &ExtractorConfig,
) -> ExtractResult<MetricRecord> {
    let loaded = load_record(path)?;

    let table = TurnTable::materialize(&loaded.turns, config.temp_dir.as_deref())?;
    let output = routine.align(table.path(), SPEAKER_COLUMN, UTTERANCE_COLUMN);
    table.release();

    let metrics = output?.metric_set()?;
    Ok(MetricRecord {
        file: loaded.record.file_id,
        quality: loaded.record.quality,
        metrics,
    })
}

fn failure(file: String, error: String) -> TaskResult {
    TaskResult::Failure(TaskFailure {
        trace: vec![error.clone()],
        file,
        error,
    })
}

fn describe_join_error(e: JoinError) -> String {
    if e.is_panic() {
        let payload = e.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        format!("WorkerPanic: {}", message)
    } else {
        format!("WorkerCancelled: {}", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::json;

    use crate::error::ExtractError;
    use crate::models::AlignmentOutput;

    /// Returns fixed metrics and remembers every table it was handed
    #[derive(Default)]
    struct RecordingRoutine {
        seen: Mutex<Vec<(PathBuf, String)>>,
    }

    impl AlignmentRoutine for RecordingRoutine {
        fn align(
            &self,
            table: &Path,
            speaker_column: &str,
            utterance_column: &str,
        ) -> ExtractResult<AlignmentOutput> {
            assert_eq!(speaker_column, "Speaker");
            assert_eq!(utterance_column, "Utterance");

            let content = std::fs::read_to_string(table).map_err(ExtractError::Resource)?;
            if content.contains("explode") {
                panic!("alignment crashed");
            }
            if content.contains("reject") {
                return Err(ExtractError::Routine("empty vocabulary".to_string()));
            }
            std::thread::sleep(Duration::from_millis(20));
            // Another task must not have touched our table in the meantime
            let again = std::fs::read_to_string(table).map_err(ExtractError::Resource)?;
            assert_eq!(content, again);

            self.seen
                .lock()
                .unwrap()
                .push((table.to_path_buf(), content));
            Ok(serde_json::from_value(json!({
                "speaker_independent": {"ER": 0.4, "EE": 0.2},
                "speaker_dependent": {
                    "Affirmative side": {"ER": 0.3, "EE": 0.1, "Initiated": 0.5},
                    "Negative side": {"ER": 0.6, "EE": 0.3, "Initiated": 0.5}
                }
            }))?)
        }
    }

    fn write_debate(dir: &Path, name: &str, seed: &str, quality: f64) {
        let mut affirmative: Vec<_> = (0..5).map(|i| json!({"content": format!("a{}", i)})).collect();
        affirmative.push(json!({"content": seed}));
        let negative: Vec<_> = (0..6).map(|i| json!({"content": format!("n{}", i)})).collect();
        let debate = json!({
            "players": {"Affirmative side": affirmative, "Negative side": negative},
            "comet score": quality
        });
        std::fs::write(dir.join(name), debate.to_string()).unwrap();
    }

    fn config(temp_dir: &Path, workers: usize) -> ExtractorConfig {
        ExtractorConfig {
            workers,
            temp_dir: Some(temp_dir.to_path_buf()),
        }
    }

    #[tokio::test]
    async fn test_malformed_file_is_isolated() {
        let input = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        write_debate(input.path(), "one.json", "seed one", 0.8);
        write_debate(input.path(), "two.json", "seed two", 0.6);
        std::fs::write(input.path().join("bad.json"), "{\"players\": [").unwrap();

        let routine = Arc::new(RecordingRoutine::default());
        let outcome = execute_stage1(input.path(), routine.clone(), &config(scratch.path(), 2))
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.success_count(), 2);
        let failures: Vec<_> = outcome.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].file, "bad.json");
        assert!(failures[0].error.contains("JSONDecodeError"));

        let series = outcome.series();
        assert_eq!(series.len(), 2);
        for (i, file) in series.files.iter().enumerate() {
            let expected = if file == "one.json" { 0.8 } else { 0.6 };
            assert_eq!(series.quality[i], expected);
            assert_eq!(series.er[i], 0.4);
        }
    }

    #[tokio::test]
    async fn test_temporary_tables_are_removed() {
        let input = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        write_debate(input.path(), "ok.json", "fine", 0.5);
        write_debate(input.path(), "rejected.json", "reject me", 0.5);
        write_debate(input.path(), "crash.json", "explode now", 0.5);

        let routine = Arc::new(RecordingRoutine::default());
        let outcome = execute_stage1(input.path(), routine, &config(scratch.path(), 3))
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.success_count(), 1);
        let leftovers: Vec<_> = std::fs::read_dir(scratch.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_failure() {
        let input = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        write_debate(input.path(), "crash.json", "explode", 0.5);
        write_debate(input.path(), "ok.json", "fine", 0.5);

        let routine = Arc::new(RecordingRoutine::default());
        let outcome = execute_stage1(input.path(), routine, &config(scratch.path(), 2))
            .await
            .unwrap();

        let failures: Vec<_> = outcome.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].file, "crash.json");
        assert_eq!(failures[0].error, "WorkerPanic: alignment crashed");
    }

    #[tokio::test]
    async fn test_routine_error_is_reported() {
        let input = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        write_debate(input.path(), "rejected.json", "reject", 0.5);

        let routine = Arc::new(RecordingRoutine::default());
        let outcome = execute_stage1(input.path(), routine, &config(scratch.path(), 1))
            .await
            .unwrap();

        let failures: Vec<_> = outcome.failures().collect();
        assert_eq!(
            failures[0].error,
            "ExternalRoutineError: alignment routine failed: empty vocabulary"
        );
    }

    #[tokio::test]
    async fn test_concurrent_tasks_use_distinct_tables() {
        let input = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        for i in 0..8 {
            write_debate(input.path(), &format!("d{}.json", i), &format!("seed-{}", i), 0.1 * i as f64);
        }

        let routine = Arc::new(RecordingRoutine::default());
        let outcome = execute_stage1(input.path(), routine.clone(), &config(scratch.path(), 4))
            .await
            .unwrap();
        assert_eq!(outcome.success_count(), 8);

        let seen = routine.seen.lock().unwrap();
        let paths: HashSet<&PathBuf> = seen.iter().map(|(p, _)| p).collect();
        assert_eq!(paths.len(), 8);
        let seeds: HashSet<String> = seen
            .iter()
            .filter_map(|(_, content)| content.lines().nth(1).map(|l| l.to_string()))
            .collect();
        assert_eq!(seeds.len(), 8);
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let input = tempfile::tempdir().unwrap();
        let routine = Arc::new(RecordingRoutine::default());
        let outcome = execute_stage1(input.path(), routine, &ExtractorConfig::default())
            .await
            .unwrap();
        assert!(outcome.results.is_empty());
        assert!(outcome.series().is_empty());
    }

    #[test]
    fn test_default_workers() {
        assert!(ExtractorConfig::default().workers >= 1);
    }
}
