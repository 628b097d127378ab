use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use game_core::{
    Board, GameSession, LeaderboardRanker, OpenOutcome, SessionEvent, SessionEventBus,
    SessionEventHandler,
};
use game_persistence::{ResultStore, RetryPolicy, read_until_visible};
use game_types::{
    AnswerResponse, ClueId, ClueView, FinalResultResponse, FinalRoundCategory, FinalRoundPrompt,
    GameError, GameResult, LeaderboardEntry, OpenClueResponse, PlayerId, PublicBoard,
    SessionStatus, SessionView,
};

/// Logs every session event.
pub struct TracingEventHandler;

impl SessionEventHandler for TracingEventHandler {
    fn handle_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::SessionStarted {
                player_id,
                total_clues,
            } => info!("Session started for {} with {} clues", player_id, total_clues),
            SessionEvent::ClueOpened {
                player_id,
                clue_id,
                requires_wager,
            } => debug!(
                "Player {} opened clue {} (wager required: {})",
                player_id, clue_id, requires_wager
            ),
            SessionEvent::WagerAccepted {
                player_id,
                clue_id,
                wager,
            } => debug!("Player {} wagered {} on clue {}", player_id, wager, clue_id),
            SessionEvent::ClueAnswered {
                player_id,
                attempt,
                cumulative_score,
            } => debug!(
                "Player {} clue {}: {:?} {:+} (score {})",
                player_id, attempt.clue_id, attempt.outcome, attempt.points_delta, cumulative_score
            ),
            SessionEvent::FinalRoundReady {
                player_id,
                cumulative_score,
            } => info!(
                "Player {} reached the final round with {}",
                player_id, cumulative_score
            ),
            SessionEvent::FinalWagerAccepted { player_id, wager } => {
                info!("Player {} wagered {} on the final round", player_id, wager)
            }
            SessionEvent::GameCompleted { result } => info!(
                "Player {} finished {} with {}",
                result.player_id, result.game_date, result.final_score
            ),
        }
    }
}

#[derive(Debug)]
struct ActiveSession {
    session: GameSession,
    /// When the think-time clock for the open clue started.
    clue_started_at: Option<Instant>,
    /// Whether the final answer was right, once settled.
    final_correct: Option<bool>,
    /// Set once the completed result has been accepted by the store.
    saved: bool,
    /// Set once the final result and leaderboard reached the player.
    reported: bool,
    created_at: Instant,
    last_activity: Instant,
}

impl ActiveSession {
    fn new(session: GameSession, now: Instant) -> Self {
        Self {
            session,
            clue_started_at: None,
            final_correct: None,
            saved: false,
            reported: false,
            created_at: now,
            last_activity: now,
        }
    }

    fn update_activity(&mut self, now: Instant) {
        self.last_activity = now;
    }

    fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() >= timeout
    }

    fn elapsed_on_clue(&self, now: Instant) -> Duration {
        self.clue_started_at
            .map(|started| now.saturating_duration_since(started))
            .unwrap_or_default()
    }
}

/// Hosts one game session per signed-in player.
pub struct GameManager {
    board: Arc<Board>,
    sessions: RwLock<HashMap<PlayerId, ActiveSession>>,
    store: Arc<dyn ResultStore>,
    event_bus: SessionEventBus,
    retry_policy: RetryPolicy,
    final_leaderboard_limit: usize,
}

impl GameManager {
    pub fn new(board: Arc<Board>, store: Arc<dyn ResultStore>, retry_policy: RetryPolicy) -> Self {
        let mut event_bus = SessionEventBus::new();
        event_bus.add_handler(Box::new(TracingEventHandler));

        Self {
            board,
            sessions: RwLock::new(HashMap::new()),
            store,
            event_bus,
            retry_policy,
            final_leaderboard_limit: 10,
        }
    }

    pub fn with_final_leaderboard_limit(mut self, limit: usize) -> Self {
        self.final_leaderboard_limit = limit.max(1);
        self
    }

    pub fn add_event_handler(&mut self, handler: Box<dyn SessionEventHandler>) {
        self.event_bus.add_handler(handler);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The board as a fresh player sees it.
    pub fn public_board(&self) -> PublicBoard {
        self.board.public_view(&Default::default())
    }

    /// Start (or resume) the player's game for `game_date`.
    pub async fn start_session(
        &self,
        player_id: PlayerId,
        game_date: NaiveDate,
    ) -> Result<SessionView, GameError> {
        {
            let mut sessions = self.sessions.write().await;
            if let Some(active) = sessions.get_mut(&player_id) {
                if active.session.game_date() == game_date && !active.saved {
                    active.update_activity(Instant::now());
                    return Ok(active.session.view());
                }
            }
        }

        if self.store.has_played(player_id, game_date).await? {
            return Err(GameError::AlreadyPlayed {
                game_date: game_date.to_string(),
            });
        }

        let mut sessions = self.sessions.write().await;
        let mut session = GameSession::new(player_id, game_date, self.board.clone());
        self.event_bus.publish_all(session.drain_events());
        let view = session.view();

        if sessions.contains_key(&player_id) {
            info!("Replacing stale session for player {}", player_id);
        }
        sessions.insert(player_id, ActiveSession::new(session, Instant::now()));

        Ok(view)
    }

    pub async fn session_view(&self, player_id: PlayerId) -> Result<SessionView, GameError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&player_id)
            .map(|active| active.session.view())
            .ok_or(GameError::SessionNotFound)
    }

    pub async fn open_clue(
        &self,
        player_id: PlayerId,
        clue_id: ClueId,
    ) -> Result<OpenClueResponse, GameError> {
        self.open_clue_at(player_id, clue_id, Instant::now()).await
    }

    /// Open a clue. The think-time clock starts now for regular clues; daily
    /// doubles start it when the wager is accepted.
    pub async fn open_clue_at(
        &self,
        player_id: PlayerId,
        clue_id: ClueId,
        now: Instant,
    ) -> Result<OpenClueResponse, GameError> {
        let mut sessions = self.sessions.write().await;
        let active = sessions
            .get_mut(&player_id)
            .ok_or(GameError::SessionNotFound)?;
        active.update_activity(now);

        let opened = match active.session.open(clue_id)? {
            OpenOutcome::Opened(clue) => Some((ClueView::from(clue), clue.is_wager_clue)),
            OpenOutcome::AlreadyAnswered => None,
        };
        self.event_bus.publish_all(active.session.drain_events());

        let Some((clue, is_wager_clue)) = opened else {
            return Ok(OpenClueResponse::AlreadyAnswered { clue_id });
        };

        let requires_wager = is_wager_clue && active.session.open_clue_wager().is_none();
        if !is_wager_clue && active.clue_started_at.is_none() {
            active.clue_started_at = Some(now);
        }

        Ok(OpenClueResponse::Opened {
            clue,
            requires_wager,
            max_wager: if requires_wager {
                active.session.max_wager()
            } else {
                None
            },
        })
    }

    pub async fn place_clue_wager(
        &self,
        player_id: PlayerId,
        wager: i32,
    ) -> Result<SessionView, GameError> {
        self.place_clue_wager_at(player_id, wager, Instant::now())
            .await
    }

    pub async fn place_clue_wager_at(
        &self,
        player_id: PlayerId,
        wager: i32,
        now: Instant,
    ) -> Result<SessionView, GameError> {
        let mut sessions = self.sessions.write().await;
        let active = sessions
            .get_mut(&player_id)
            .ok_or(GameError::SessionNotFound)?;
        active.update_activity(now);

        active.session.place_wager(wager)?;
        active.clue_started_at = Some(now);
        self.event_bus.publish_all(active.session.drain_events());

        Ok(active.session.view())
    }

    pub async fn answer_clue(
        &self,
        player_id: PlayerId,
        answer: &str,
    ) -> Result<AnswerResponse, GameError> {
        self.answer_clue_at(player_id, answer, Instant::now()).await
    }

    pub async fn answer_clue_at(
        &self,
        player_id: PlayerId,
        answer: &str,
        now: Instant,
    ) -> Result<AnswerResponse, GameError> {
        let mut sessions = self.sessions.write().await;
        let active = sessions
            .get_mut(&player_id)
            .ok_or(GameError::SessionNotFound)?;
        active.update_activity(now);

        let correct_answer = active
            .session
            .open_clue()
            .map(|clue| clue.canonical_answer.clone())
            .ok_or(GameError::ClueNotOpen)?;
        let elapsed = active.elapsed_on_clue(now);

        let attempt = active.session.answer(answer, elapsed)?;
        active.clue_started_at = None;
        self.event_bus.publish_all(active.session.drain_events());

        Ok(AnswerResponse {
            attempt,
            correct_answer,
            cumulative_score: active.session.cumulative_score(),
            status: active.session.status(),
        })
    }

    pub async fn skip_clue(&self, player_id: PlayerId) -> Result<AnswerResponse, GameError> {
        self.skip_clue_at(player_id, Instant::now()).await
    }

    pub async fn skip_clue_at(
        &self,
        player_id: PlayerId,
        now: Instant,
    ) -> Result<AnswerResponse, GameError> {
        let mut sessions = self.sessions.write().await;
        let active = sessions
            .get_mut(&player_id)
            .ok_or(GameError::SessionNotFound)?;
        active.update_activity(now);

        let correct_answer = active
            .session
            .open_clue()
            .map(|clue| clue.canonical_answer.clone())
            .ok_or(GameError::ClueNotOpen)?;
        let elapsed = active.elapsed_on_clue(now);

        let attempt = active.session.skip(elapsed)?;
        active.clue_started_at = None;
        self.event_bus.publish_all(active.session.drain_events());

        Ok(AnswerResponse {
            attempt,
            correct_answer,
            cumulative_score: active.session.cumulative_score(),
            status: active.session.status(),
        })
    }

    /// Final category and wager ceiling, available once the board is cleared.
    pub async fn final_round_category(
        &self,
        player_id: PlayerId,
    ) -> Result<FinalRoundCategory, GameError> {
        let sessions = self.sessions.read().await;
        let active = sessions.get(&player_id).ok_or(GameError::SessionNotFound)?;

        let max_wager = active
            .session
            .max_wager()
            .filter(|_| active.session.status() == SessionStatus::FinalRoundPending)
            .ok_or_else(|| GameError::InvalidSessionState {
                current_state: active.session.status().to_string(),
            })?;

        Ok(FinalRoundCategory {
            category: self.board.final_clue().category.clone(),
            max_wager,
        })
    }

    /// Lock in the final wager and reveal the final clue.
    pub async fn place_final_wager(
        &self,
        player_id: PlayerId,
        wager: i32,
    ) -> Result<FinalRoundPrompt, GameError> {
        let mut sessions = self.sessions.write().await;
        let active = sessions
            .get_mut(&player_id)
            .ok_or(GameError::SessionNotFound)?;
        active.update_activity(Instant::now());

        active.session.place_final_wager(wager)?;
        self.event_bus.publish_all(active.session.drain_events());

        let final_clue = self.board.final_clue();
        Ok(FinalRoundPrompt {
            category: final_clue.category.clone(),
            prompt: final_clue.prompt.clone(),
            wager,
        })
    }

    /// Settle the final round, save the result exactly once, and return the
    /// refreshed leaderboard.
    ///
    /// If the save or the leaderboard read fails the session keeps its settled
    /// result; calling this again retries only the step that failed, without
    /// re-scoring. Once the response has been returned, further calls are
    /// rejected with `DuplicateCompletion`.
    pub async fn submit_final_answer(
        &self,
        player_id: PlayerId,
        answer: &str,
    ) -> Result<FinalResultResponse, GameError> {
        let (result, correct, already_saved) = {
            let mut sessions = self.sessions.write().await;
            let active = sessions
                .get_mut(&player_id)
                .ok_or(GameError::SessionNotFound)?;
            active.update_activity(Instant::now());

            if active.reported {
                return Err(GameError::DuplicateCompletion);
            }

            match (active.session.result(), active.final_correct) {
                (Some(result), Some(correct)) => {
                    info!(
                        "Retrying completion for player {} (saved: {})",
                        player_id, active.saved
                    );
                    (result.clone(), correct, active.saved)
                }
                _ => {
                    let completion = active.session.settle_final_round(answer, Utc::now())?;
                    self.event_bus.publish_all(active.session.drain_events());
                    active.final_correct = Some(completion.correct);
                    (completion.result, completion.correct, false)
                }
            }
        };

        if !already_saved {
            self.store.save(&result).await?;
            self.mark_session(player_id, |active| active.saved = true)
                .await;
        }

        let ranked = self.read_leaderboard_including(&result).await?;
        let rank = LeaderboardRanker::rank_of(&ranked, player_id);
        self.mark_session(player_id, |active| active.reported = true)
            .await;

        Ok(FinalResultResponse {
            correct,
            correct_answer: self.board.final_clue().canonical_answer.clone(),
            leaderboard: LeaderboardRanker::top(ranked, self.final_leaderboard_limit),
            rank,
            result,
        })
    }

    /// Ranked leaderboard, one row per player, optionally for a single date.
    pub async fn leaderboard(
        &self,
        game_date: Option<NaiveDate>,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, GameError> {
        let ranked = self.ranked_leaderboard(game_date).await?;
        Ok(LeaderboardRanker::top(ranked, limit))
    }

    pub async fn has_played(
        &self,
        player_id: PlayerId,
        game_date: NaiveDate,
    ) -> Result<bool, GameError> {
        self.store.has_played(player_id, game_date).await
    }

    pub async fn most_recent(&self, player_id: PlayerId) -> Result<Option<GameResult>, GameError> {
        self.store.most_recent(player_id).await
    }

    /// Drop sessions with no activity within `timeout`. Returns how many were removed.
    pub async fn cleanup_abandoned_sessions(&self, timeout: Duration) -> usize {
        let mut sessions_to_remove = Vec::new();

        {
            let sessions = self.sessions.read().await;
            for (player_id, active) in sessions.iter() {
                if active.is_expired(timeout) {
                    sessions_to_remove.push(*player_id);
                }
            }
        }

        if sessions_to_remove.is_empty() {
            return 0;
        }

        let mut sessions = self.sessions.write().await;
        let mut removed = 0;
        for player_id in sessions_to_remove {
            // Activity may have resumed since the read pass
            if !sessions
                .get(&player_id)
                .is_some_and(|active| active.is_expired(timeout))
            {
                continue;
            }
            if let Some(active) = sessions.remove(&player_id) {
                removed += 1;
                if active.session.result().is_some() && !active.saved {
                    warn!(
                        "Dropped completed but unsaved session for player {} after {:?}",
                        player_id,
                        active.created_at.elapsed()
                    );
                } else {
                    info!("Removed abandoned session for player {}", player_id);
                }
            }
        }
        removed
    }

    pub async fn active_session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn mark_session(&self, player_id: PlayerId, mark: impl FnOnce(&mut ActiveSession)) {
        let mut sessions = self.sessions.write().await;
        if let Some(active) = sessions.get_mut(&player_id) {
            mark(active);
        }
    }

    async fn ranked_leaderboard(
        &self,
        game_date: Option<NaiveDate>,
    ) -> Result<Vec<LeaderboardEntry>, GameError> {
        let results = self.store.fetch_all(game_date).await?;

        let mut player_ids: Vec<PlayerId> = results.iter().map(|result| result.player_id).collect();
        player_ids.sort();
        player_ids.dedup();
        let display_names = self.store.display_names(&player_ids).await?;

        Ok(LeaderboardRanker::rank_best_per_player(
            &results,
            &display_names,
        ))
    }

    /// Poll the all-time leaderboard until it reflects `result`.
    async fn read_leaderboard_including(
        &self,
        result: &GameResult,
    ) -> Result<Vec<LeaderboardEntry>, GameError> {
        read_until_visible(
            &self.retry_policy,
            || self.ranked_leaderboard(None),
            |entries: &Vec<LeaderboardEntry>| {
                entries.iter().any(|entry| {
                    entry.player_id == result.player_id && entry.final_score >= result.final_score
                })
            },
        )
        .await
    }
}
