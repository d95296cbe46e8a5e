use std::fmt;

use serde::{Deserialize, Serialize};

use super::Record;
use crate::error::{ExtractError, ExtractResult};

/// Index of the affirmative turn that opens the reconstructed sequence
pub const AFFIRMATIVE_OPENING_INDEX: usize = 5;

/// Number of leading negative turns dropped before alternation starts
pub const NEGATIVE_SKIP: usize = 2;

/// One side of the debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "Affirmative side")]
    Affirmative,
    #[serde(rename = "Negative side")]
    Negative,
}

impl Side {
    /// Speaker label as it appears in the record file and the turn table
    pub fn label(self) -> &'static str {
        match self {
            Side::Affirmative => "Affirmative side",
            Side::Negative => "Negative side",
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Affirmative => Side::Negative,
            Side::Negative => Side::Affirmative,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single (speaker, utterance) row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Side,
    pub utterance: String,
}

/// Ordered turns fed to the alignment routine
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TurnSequence {
    pub turns: Vec<Turn>,
}

impl TurnSequence {
    /// Rebuild the exchange from a record.
    ///
    /// Row 0 is the affirmative opening turn. The remaining rows walk the
    /// negative side's list from its third element, labelling them
    /// Negative, Affirmative, Negative, ... in turn.
    pub fn from_record(record: &Record) -> ExtractResult<Self> {
        let opening = record
            .affirmative
            .get(AFFIRMATIVE_OPENING_INDEX)
            .ok_or_else(|| {
                ExtractError::MissingField(format!(
                    "players.Affirmative side[{}].content (side has {} turns)",
                    AFFIRMATIVE_OPENING_INDEX,
                    record.affirmative.len()
                ))
            })?;

        let mut turns = Vec::with_capacity(1 + record.negative.len().saturating_sub(NEGATIVE_SKIP));
        turns.push(Turn {
            speaker: Side::Affirmative,
            utterance: opening.clone(),
        });

        let mut speaker = Side::Negative;
        for utterance in record.negative.iter().skip(NEGATIVE_SKIP) {
            turns.push(Turn {
                speaker,
                utterance: utterance.clone(),
            });
            speaker = speaker.opposite();
        }

        Ok(Self { turns })
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }
}
