use game_types::GameError;

/// Players may always wager up to this much, even with a lower (or negative) score.
pub const MINIMUM_WAGER_CEILING: i32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WagerKind {
    DailyDouble,
    FinalRound,
}

pub struct WagerValidator;

impl WagerValidator {
    /// Largest wager allowed at the given score.
    pub fn max_wager(current_score: i32, kind: WagerKind) -> i32 {
        // Daily doubles and the final round share the same ceiling rule
        match kind {
            WagerKind::DailyDouble | WagerKind::FinalRound => {
                current_score.max(MINIMUM_WAGER_CEILING)
            }
        }
    }

    /// Accept `0 <= wager <= max_wager`, otherwise reject without side effects.
    pub fn validate(wager: i32, current_score: i32, kind: WagerKind) -> Result<(), GameError> {
        let max_wager = Self::max_wager(current_score, kind);
        if (0..=max_wager).contains(&wager) {
            Ok(())
        } else {
            tracing::warn!(wager, current_score, max_wager, ?kind, "Wager rejected");
            Err(GameError::InvalidWager { wager, max_wager })
        }
    }
}
