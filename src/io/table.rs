use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::models::TurnSequence;

/// Column label for the speaker field
pub const SPEAKER_COLUMN: &str = "Speaker";
/// Column label for the utterance field
pub const UTTERANCE_COLUMN: &str = "Utterance";

const TABLE_PREFIX: &str = "debalign-";
const TABLE_SUFFIX: &str = ".csv";

/// A turn sequence written to a uniquely named temporary CSV file.
///
/// The file lives exactly as long as this value: it is removed by
/// [`TurnTable::release`] or, on early return or unwind, by drop.
pub struct TurnTable {
    file: NamedTempFile,
}

impl TurnTable {
    /// Write `turns` to a new temporary file, in `dir` or the system temp dir
    pub fn materialize(turns: &TurnSequence, dir: Option<&Path>) -> ExtractResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TABLE_PREFIX).suffix(TABLE_SUFFIX);
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(ExtractError::Resource)?;

        {
            let mut writer = BufWriter::new(file.as_file_mut());
            write_csv(turns, &mut writer).map_err(ExtractError::Resource)?;
            writer.flush().map_err(ExtractError::Resource)?;
        }

        debug!("Wrote {} turns to {:?}", turns.len(), file.path());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the file; a failed removal is logged and otherwise ignored
    pub fn release(self) {
        let path: PathBuf = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            warn!("Failed to remove turn table {:?}: {}", path, e);
        }
    }
}

/// Write the sequence as CSV with a `Speaker,Utterance` header
pub fn write_csv<W: Write>(turns: &TurnSequence, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{},{}", SPEAKER_COLUMN, UTTERANCE_COLUMN)?;
    for turn in turns.iter() {
        writeln!(
            out,
            "{},{}",
            quote_field(turn.speaker.label()),
            quote_field(&turn.utterance)
        )?;
    }
    Ok(())
}

/// Quote a CSV field when it holds a delimiter, quote or line break
fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
