use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ClueId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum GameError {
    #[error("Wager must be between 0 and {max_wager}, got {wager}")]
    InvalidWager { wager: i32, max_wager: i32 },
    #[error("Answer is empty or malformed")]
    EmptyOrMalformedAnswer,
    #[error("Result store failure: {message}")]
    PersistenceFailure { message: String },
    #[error("Game has already been completed")]
    DuplicateCompletion,
    #[error("Clue {clue_id} is not on this board")]
    ClueNotFound { clue_id: ClueId },
    #[error("No clue is currently open")]
    ClueNotOpen,
    #[error("Clue {clue_id} is still open")]
    ClueAlreadyOpen { clue_id: ClueId },
    #[error("A wager must be placed before answering this clue")]
    WagerRequired,
    #[error("This clue cannot be skipped")]
    SkipNotAllowed,
    #[error("Already played the game for {game_date}")]
    AlreadyPlayed { game_date: String },
    #[error("No active game session")]
    SessionNotFound,
    #[error("Action not allowed while the game is {current_state}")]
    InvalidSessionState { current_state: String },
    #[error("Authentication required")]
    AuthenticationRequired,
}

impl GameError {
    /// Only storage failures are worth retrying; everything else needs a different request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::PersistenceFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_persistence_failures_are_retryable() {
        let failure = GameError::PersistenceFailure {
            message: "connection reset".to_string(),
        };
        assert!(failure.is_retryable());
        assert!(!GameError::DuplicateCompletion.is_retryable());
        assert!(!GameError::InvalidWager { wager: 5000, max_wager: 2000 }.is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let err = GameError::InvalidWager { wager: 2001, max_wager: 2000 };
        assert_eq!(err.to_string(), "Wager must be between 0 and 2000, got 2001");
    }
}
