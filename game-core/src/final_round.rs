use game_types::GameError;

use crate::{AnswerMatcher, WagerKind, WagerValidator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub correct: bool,
    pub final_score: i32,
}

pub struct FinalRoundSettlement;

impl FinalRoundSettlement {
    /// Settle the end-of-game wager. Strictly won/lost, no time decay.
    pub fn settle(
        current_score: i32,
        wager: i32,
        submitted_answer: &str,
        canonical_answer: &str,
    ) -> Result<Settlement, GameError> {
        WagerValidator::validate(wager, current_score, WagerKind::FinalRound)?;

        let correct = AnswerMatcher::matches(submitted_answer, canonical_answer);
        let final_score = if correct {
            current_score.saturating_add(wager)
        } else {
            current_score.saturating_sub(wager)
        };

        tracing::debug!(current_score, wager, correct, final_score, "Final round settled");

        Ok(Settlement { correct, final_score })
    }
}
