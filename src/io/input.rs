use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::{ExtractError, ExtractResult};
use crate::models::{DebateFile, Record};

/// List the regular files directly under `dir` (non-recursive)
pub fn discover_record_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory: {:?}", dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list directory: {:?}", dir))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File identifier used in results and log lines
pub fn file_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Load a debate record file
pub fn parse_record_file(path: &Path) -> ExtractResult<Record> {
    let content = read(path)?;
    parse_record_json(&file_id(path), &content)
}

/// Parse a debate record from a JSON string
pub fn parse_record_json(file_id: &str, json: &str) -> ExtractResult<Record> {
    let debate: DebateFile = serde_json::from_str(json)?;
    Ok(Record::from_debate(file_id, debate))
}

#[derive(Deserialize)]
struct QualityOnly {
    #[serde(rename = "comet score")]
    comet_score: f64,
}

/// Read only the quality score of a record file
pub fn read_quality_score(path: &Path) -> ExtractResult<f64> {
    let content = read(path)?;
    let quality: QualityOnly = serde_json::from_str(&content)?;
    Ok(quality.comet_score)
}

fn read(path: &Path) -> ExtractResult<String> {
    std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })
}
