use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{ClueId, PlayerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CluePrompt {
    Text { text: String },
    Image { path: String },
}

/// A single board clue. Loaded once per game instance and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Clue {
    pub id: ClueId,
    pub category: String,
    pub prompt: CluePrompt,
    pub canonical_answer: String,
    pub face_value: i32,
    pub is_wager_clue: bool, // Daily double
}

impl Clue {
    pub fn is_image_clue(&self) -> bool {
        matches!(self.prompt, CluePrompt::Image { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AttemptOutcome {
    Correct,
    Incorrect,
    Skipped, // "I don't know"
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClueAttempt {
    pub clue_id: ClueId,
    pub elapsed_seconds: f64,
    pub wager_amount: Option<i32>,
    pub submitted_answer: Option<String>,
    pub outcome: AttemptOutcome,
    pub points_delta: i32,
}

/// The single persisted outcome of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameResult {
    pub player_id: PlayerId,
    pub final_score: i32,
    #[ts(type = "string")]
    pub game_date: NaiveDate,
    #[ts(type = "string")]
    pub completed_at: DateTime<Utc>,
}

/// Ranked projection of a GameResult. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub player_id: PlayerId,
    pub display_name: String,
    #[serde(rename = "score")]
    pub final_score: i32,
    #[ts(type = "string")]
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SessionStatus {
    InProgress,
    FinalRoundPending,
    FinalRoundInProgress,
    Completed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionStatus::InProgress => "in progress",
            SessionStatus::FinalRoundPending => "waiting for the final wager",
            SessionStatus::FinalRoundInProgress => "in the final round",
            SessionStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Board slot as shown to a player: no answer, no daily-double marker.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PublicClueSlot {
    pub id: ClueId,
    pub face_value: i32,
    pub answered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PublicCategory {
    pub name: String,
    pub clues: Vec<PublicClueSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PublicBoard {
    pub categories: Vec<PublicCategory>,
    pub final_category: String,
}

/// Clue as revealed once opened. The canonical answer stays server-side.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClueView {
    pub id: ClueId,
    pub category: String,
    pub prompt: CluePrompt,
    pub face_value: i32,
    pub is_daily_double: bool,
}

impl From<&Clue> for ClueView {
    fn from(clue: &Clue) -> Self {
        ClueView {
            id: clue.id,
            category: clue.category.clone(),
            prompt: clue.prompt.clone(),
            face_value: clue.face_value,
            is_daily_double: clue.is_wager_clue,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionView {
    pub player_id: PlayerId,
    #[ts(type = "string")]
    pub game_date: NaiveDate,
    pub status: SessionStatus,
    pub cumulative_score: i32,
    pub answered_count: u32,
    pub total_clues: u32,
    pub open_clue: Option<ClueView>,
    pub open_clue_wager: Option<i32>,
    pub final_wager: Option<i32>,
    pub final_score: Option<i32>,
    pub board: PublicBoard,
}
