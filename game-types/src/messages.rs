use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{
    ClueAttempt, ClueId, ClueView, CluePrompt, GameError, GameResult, LeaderboardEntry, SessionStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WagerRequest {
    pub wager: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum OpenClueResponse {
    Opened {
        clue: ClueView,
        requires_wager: bool,
        max_wager: Option<i32>,
    },
    AlreadyAnswered {
        clue_id: ClueId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnswerResponse {
    pub attempt: ClueAttempt,
    pub correct_answer: String,
    pub cumulative_score: i32,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinalRoundPrompt {
    pub category: String,
    pub prompt: CluePrompt,
    pub wager: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinalRoundCategory {
    pub category: String,
    pub max_wager: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinalResultResponse {
    pub result: GameResult,
    pub correct: bool,
    pub correct_answer: String,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameStatusResponse {
    pub has_played: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MostRecentResponse {
    pub result: Option<GameResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: GameError,
    pub message: String,
    pub retryable: bool,
}

impl From<GameError> for ErrorResponse {
    fn from(error: GameError) -> Self {
        ErrorResponse {
            message: error.to_string(),
            retryable: error.is_retryable(),
            error,
        }
    }
}
