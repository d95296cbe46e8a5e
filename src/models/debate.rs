use serde::{Deserialize, Serialize};

/// Root of a debate record file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebateFile {
    pub players: DebatePlayers,
    /// Translation-quality score attached to the debate
    #[serde(rename = "comet score")]
    pub comet_score: f64,
}

/// Turns spoken by each side of the debate
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebatePlayers {
    #[serde(rename = "Affirmative side")]
    pub affirmative: Vec<DebateTurn>,
    #[serde(rename = "Negative side")]
    pub negative: Vec<DebateTurn>,
}

/// A single turn; any other keys on the turn object are ignored
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebateTurn {
    pub content: String,
}

/// A loaded debate with its quality score. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// File name the record was loaded from
    pub file_id: String,
    pub affirmative: Vec<String>,
    pub negative: Vec<String>,
    pub quality: f64,
}

impl Record {
    pub fn from_debate(file_id: impl Into<String>, debate: DebateFile) -> Self {
        let DebateFile {
            players,
            comet_score,
        } = debate;
        Self {
            file_id: file_id.into(),
            affirmative: players.affirmative.into_iter().map(|t| t.content).collect(),
            negative: players.negative.into_iter().map(|t| t.content).collect(),
            quality: comet_score,
        }
    }
}
