use chrono::{DateTime, NaiveDate, Utc};
use game_types::{
    AttemptOutcome, Clue, ClueAttempt, ClueId, ClueView, GameError, GameResult, PlayerId,
    SessionStatus, SessionView,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    AnswerMatcher, Board, ClueScorer, FinalRoundSettlement, SessionEvent, WagerKind,
    WagerValidator,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    InProgress,
    FinalRoundPending,
    FinalRoundInProgress { wager: i32 },
    Completed { result: GameResult },
}

impl SessionPhase {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionPhase::InProgress => SessionStatus::InProgress,
            SessionPhase::FinalRoundPending => SessionStatus::FinalRoundPending,
            SessionPhase::FinalRoundInProgress { .. } => SessionStatus::FinalRoundInProgress,
            SessionPhase::Completed { .. } => SessionStatus::Completed,
        }
    }
}

#[derive(Debug)]
pub enum OpenOutcome<'a> {
    Opened(&'a Clue),
    /// Answered clues cannot be reopened; the click is ignored.
    AlreadyAnswered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub result: GameResult,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenClue {
    clue_id: ClueId,
    wager: Option<i32>,
}

/// One player's run through a board.
///
/// Every operation either applies completely or returns an error before
/// touching any state, so a rejected action never corrupts the score.
#[derive(Debug, Clone)]
pub struct GameSession {
    player_id: PlayerId,
    game_date: NaiveDate,
    board: Arc<Board>,
    answered: HashSet<ClueId>,
    attempts: Vec<ClueAttempt>,
    cumulative_score: i32,
    open_clue: Option<OpenClue>,
    phase: SessionPhase,
    pending_events: Vec<SessionEvent>,
}

impl GameSession {
    pub fn new(player_id: PlayerId, game_date: NaiveDate, board: Arc<Board>) -> Self {
        let total_clues = board.total_clues();
        let mut session = Self {
            player_id,
            game_date,
            board,
            answered: HashSet::new(),
            attempts: Vec::new(),
            cumulative_score: 0,
            open_clue: None,
            phase: SessionPhase::InProgress,
            pending_events: vec![SessionEvent::SessionStarted {
                player_id,
                total_clues,
            }],
        };
        session.advance_if_board_cleared();
        session
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn game_date(&self) -> NaiveDate {
        self.game_date
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn status(&self) -> SessionStatus {
        self.phase.status()
    }

    pub fn cumulative_score(&self) -> i32 {
        self.cumulative_score
    }

    pub fn answered_count(&self) -> usize {
        self.answered.len()
    }

    pub fn total_clues(&self) -> usize {
        self.board.total_clues()
    }

    pub fn is_answered(&self, clue_id: ClueId) -> bool {
        self.answered.contains(&clue_id)
    }

    pub fn attempts(&self) -> &[ClueAttempt] {
        &self.attempts
    }

    pub fn open_clue(&self) -> Option<&Clue> {
        self.open_clue
            .and_then(|open| self.board.clue(open.clue_id))
    }

    pub fn open_clue_wager(&self) -> Option<i32> {
        self.open_clue.and_then(|open| open.wager)
    }

    pub fn final_wager(&self) -> Option<i32> {
        match self.phase {
            SessionPhase::FinalRoundInProgress { wager } => Some(wager),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&GameResult> {
        match &self.phase {
            SessionPhase::Completed { result } => Some(result),
            _ => None,
        }
    }

    /// Highest wager the player may place right now, if a wager is expected.
    pub fn max_wager(&self) -> Option<i32> {
        match self.phase {
            SessionPhase::InProgress => self
                .open_clue()
                .filter(|clue| clue.is_wager_clue && self.open_clue_wager().is_none())
                .map(|_| WagerValidator::max_wager(self.cumulative_score, WagerKind::DailyDouble)),
            SessionPhase::FinalRoundPending => Some(WagerValidator::max_wager(
                self.cumulative_score,
                WagerKind::FinalRound,
            )),
            _ => None,
        }
    }

    /// Open a clue from the board. Reopening an answered clue is a no-op.
    pub fn open(&mut self, clue_id: ClueId) -> Result<OpenOutcome<'_>, GameError> {
        if matches!(self.phase, SessionPhase::Completed { .. }) {
            return Err(self.invalid_state());
        }
        if self.board.clue(clue_id).is_none() {
            return Err(GameError::ClueNotFound { clue_id });
        }
        if self.answered.contains(&clue_id) {
            return Ok(OpenOutcome::AlreadyAnswered);
        }
        if self.phase != SessionPhase::InProgress {
            return Err(self.invalid_state());
        }

        let currently_open = self.open_clue;
        match currently_open {
            Some(open) if open.clue_id != clue_id => {
                return Err(GameError::ClueAlreadyOpen {
                    clue_id: open.clue_id,
                });
            }
            Some(_) => {}
            None => {
                self.open_clue = Some(OpenClue {
                    clue_id,
                    wager: None,
                });
                let requires_wager = self
                    .board
                    .clue(clue_id)
                    .is_some_and(|clue| clue.is_wager_clue);
                debug!(player_id = %self.player_id, clue_id, requires_wager, "Clue opened");
                self.pending_events.push(SessionEvent::ClueOpened {
                    player_id: self.player_id,
                    clue_id,
                    requires_wager,
                });
            }
        }

        self.board
            .clue(clue_id)
            .map(OpenOutcome::Opened)
            .ok_or(GameError::ClueNotFound { clue_id })
    }

    /// Lock in a daily-double wager for the open clue.
    pub fn place_wager(&mut self, wager: i32) -> Result<(), GameError> {
        let open = self.require_open_clue()?;
        let clue = self.clue_for(open.clue_id)?;

        if !clue.is_wager_clue {
            return Err(GameError::InvalidSessionState {
                current_state: "answering a clue that takes no wager".to_string(),
            });
        }
        if open.wager.is_some() {
            return Err(GameError::InvalidSessionState {
                current_state: "answering a clue whose wager is locked in".to_string(),
            });
        }

        WagerValidator::validate(wager, self.cumulative_score, WagerKind::DailyDouble)?;

        self.open_clue = Some(OpenClue {
            clue_id: open.clue_id,
            wager: Some(wager),
        });
        self.pending_events.push(SessionEvent::WagerAccepted {
            player_id: self.player_id,
            clue_id: open.clue_id,
            wager,
        });
        Ok(())
    }

    /// Submit an answer for the open clue. Blank answers count as incorrect.
    pub fn answer(&mut self, submitted: &str, elapsed: Duration) -> Result<ClueAttempt, GameError> {
        let open = self.require_open_clue()?;
        let clue = self.clue_for(open.clue_id)?;

        if clue.is_wager_clue && open.wager.is_none() {
            return Err(GameError::WagerRequired);
        }

        let outcome = if AnswerMatcher::is_blank(submitted) {
            debug!(player_id = %self.player_id, clue_id = clue.id, "{}", GameError::EmptyOrMalformedAnswer);
            AttemptOutcome::Incorrect
        } else if AnswerMatcher::matches(submitted, &clue.canonical_answer) {
            AttemptOutcome::Correct
        } else {
            AttemptOutcome::Incorrect
        };

        Ok(self.finish_attempt(open, Some(submitted.to_string()), outcome, elapsed))
    }

    /// "I don't know": no reward, no penalty. Not offered once a wager is in play.
    pub fn skip(&mut self, elapsed: Duration) -> Result<ClueAttempt, GameError> {
        let open = self.require_open_clue()?;
        let clue = self.clue_for(open.clue_id)?;

        if clue.is_wager_clue {
            return Err(GameError::SkipNotAllowed);
        }

        Ok(self.finish_attempt(open, None, AttemptOutcome::Skipped, elapsed))
    }

    /// Accept the final-round wager, moving the session into the final round.
    pub fn place_final_wager(&mut self, wager: i32) -> Result<(), GameError> {
        match self.phase {
            SessionPhase::FinalRoundPending => {}
            SessionPhase::Completed { .. } => return Err(GameError::DuplicateCompletion),
            _ => return Err(self.invalid_state()),
        }

        WagerValidator::validate(wager, self.cumulative_score, WagerKind::FinalRound)?;

        info!(player_id = %self.player_id, wager, score = self.cumulative_score, "Final round wager accepted");
        self.phase = SessionPhase::FinalRoundInProgress { wager };
        self.pending_events.push(SessionEvent::FinalWagerAccepted {
            player_id: self.player_id,
            wager,
        });
        Ok(())
    }

    /// Settle the final round and complete the session.
    ///
    /// This is the only place a GameResult is produced, and it can happen once.
    pub fn settle_final_round(
        &mut self,
        submitted: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<Completion, GameError> {
        let wager = match self.phase {
            SessionPhase::FinalRoundInProgress { wager } => wager,
            SessionPhase::Completed { .. } => return Err(GameError::DuplicateCompletion),
            _ => return Err(self.invalid_state()),
        };

        let settlement = FinalRoundSettlement::settle(
            self.cumulative_score,
            wager,
            submitted,
            &self.board.final_clue().canonical_answer,
        )?;

        let result = GameResult {
            player_id: self.player_id,
            final_score: settlement.final_score,
            game_date: self.game_date,
            completed_at,
        };

        info!(
            player_id = %self.player_id,
            final_score = result.final_score,
            correct = settlement.correct,
            "Game completed"
        );
        self.phase = SessionPhase::Completed {
            result: result.clone(),
        };
        self.pending_events.push(SessionEvent::GameCompleted {
            result: result.clone(),
        });

        Ok(Completion {
            result,
            correct: settlement.correct,
        })
    }

    /// Take the events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            player_id: self.player_id,
            game_date: self.game_date,
            status: self.status(),
            cumulative_score: self.cumulative_score,
            answered_count: self.answered.len() as u32,
            total_clues: self.total_clues() as u32,
            open_clue: self.open_clue().map(ClueView::from),
            open_clue_wager: self.open_clue_wager(),
            final_wager: self.final_wager(),
            final_score: self.result().map(|result| result.final_score),
            board: self.board.public_view(&self.answered),
        }
    }

    fn finish_attempt(
        &mut self,
        open: OpenClue,
        submitted_answer: Option<String>,
        outcome: AttemptOutcome,
        elapsed: Duration,
    ) -> ClueAttempt {
        let face_value = self
            .board
            .clue(open.clue_id)
            .map(|clue| clue.face_value)
            .unwrap_or_default();
        let value = open.wager.unwrap_or(face_value);
        let elapsed_seconds = elapsed.as_secs_f64();
        let points_delta = ClueScorer::score(value, elapsed_seconds, outcome);

        let attempt = ClueAttempt {
            clue_id: open.clue_id,
            elapsed_seconds,
            wager_amount: open.wager,
            submitted_answer,
            outcome,
            points_delta,
        };

        self.cumulative_score = self.cumulative_score.saturating_add(points_delta);
        self.answered.insert(open.clue_id);
        self.open_clue = None;
        self.attempts.push(attempt.clone());

        debug!(
            player_id = %self.player_id,
            clue_id = open.clue_id,
            ?outcome,
            points_delta,
            score = self.cumulative_score,
            "Clue answered"
        );
        self.pending_events.push(SessionEvent::ClueAnswered {
            player_id: self.player_id,
            attempt: attempt.clone(),
            cumulative_score: self.cumulative_score,
        });

        self.advance_if_board_cleared();
        attempt
    }

    fn advance_if_board_cleared(&mut self) {
        if self.phase == SessionPhase::InProgress && self.answered.len() == self.total_clues() {
            info!(player_id = %self.player_id, score = self.cumulative_score, "Board cleared, final round ready");
            self.phase = SessionPhase::FinalRoundPending;
            self.pending_events.push(SessionEvent::FinalRoundReady {
                player_id: self.player_id,
                cumulative_score: self.cumulative_score,
            });
        }
    }

    fn require_open_clue(&self) -> Result<OpenClue, GameError> {
        match self.phase {
            SessionPhase::InProgress => self.open_clue.ok_or(GameError::ClueNotOpen),
            _ => Err(self.invalid_state()),
        }
    }

    fn clue_for(&self, clue_id: ClueId) -> Result<&Clue, GameError> {
        self.board
            .clue(clue_id)
            .ok_or(GameError::ClueNotFound { clue_id })
    }

    fn invalid_state(&self) -> GameError {
        GameError::InvalidSessionState {
            current_state: self.status().to_string(),
        }
    }
}
