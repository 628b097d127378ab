#![allow(dead_code)]

use chrono::NaiveDate;
use game_core::{
    Board, BoardFile, CategorySpec, ClueSpec, FinalRoundSpec, GameSession, SessionEvent,
    SessionEventHandler,
};
use game_types::PlayerId;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FINAL_ANSWER: &str = "What is IBM?";

pub fn text_clue(question: &str, answer: &str, value: i32) -> ClueSpec {
    ClueSpec {
        question: question.to_string(),
        answer: answer.to_string(),
        value,
        is_daily_double: false,
        is_image: false,
        image_path: None,
    }
}

pub fn daily_double(question: &str, answer: &str, value: i32) -> ClueSpec {
    ClueSpec {
        is_daily_double: true,
        ..text_clue(question, answer, value)
    }
}

pub fn final_round() -> FinalRoundSpec {
    FinalRoundSpec {
        category: "Computers".to_string(),
        question: "Armonk-based maker of mainframes".to_string(),
        answer: FINAL_ANSWER.to_string(),
        is_image: false,
        image_path: None,
    }
}

/// Single category, five clues worth 200..1000, answers "answer 1".."answer 5".
pub fn create_ladder_board() -> Arc<Board> {
    let clues = [200, 400, 600, 800, 1000]
        .iter()
        .enumerate()
        .map(|(i, value)| {
            text_clue(
                &format!("Clue {}", i + 1),
                &format!("What is answer {}?", i + 1),
                *value,
            )
        })
        .collect();

    build_board(vec![CategorySpec {
        name: "Ladder".to_string(),
        clues,
    }])
}

/// Two text clues and one daily double worth 800 (ids 1, 2, 3).
pub fn create_daily_double_board() -> Arc<Board> {
    build_board(vec![CategorySpec {
        name: "Hometowns".to_string(),
        clues: vec![
            text_clue("Blue Ridge city on the James River", "What is Lynchburg?", 200),
            text_clue("Capital on the Liffey", "Where is Dublin?", 400),
            daily_double("Go Blue", "What is Ann Arbor?", 800),
        ],
    }])
}

pub fn create_empty_board() -> Arc<Board> {
    build_board(vec![CategorySpec {
        name: "Nothing".to_string(),
        clues: Vec::new(),
    }])
}

pub fn build_board(categories: Vec<CategorySpec>) -> Arc<Board> {
    Arc::new(
        Board::from_spec(BoardFile {
            categories,
            final_round: final_round(),
        })
        .unwrap(),
    )
}

pub fn game_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 31).unwrap()
}

pub fn create_session(board: Arc<Board>) -> GameSession {
    GameSession::new(uuid::Uuid::new_v4(), game_date(), board)
}

pub fn create_session_for(player_id: PlayerId, board: Arc<Board>) -> GameSession {
    GameSession::new(player_id, game_date(), board)
}

pub fn instant() -> Duration {
    Duration::ZERO
}

pub fn seconds(secs: f64) -> Duration {
    Duration::from_secs_f64(secs)
}

/// Answer every clue on the ladder board correctly and instantly.
pub fn clear_ladder_board(session: &mut GameSession) {
    for id in 1..=5u32 {
        session.open(id).unwrap();
        session
            .answer(&format!("answer {}", id), instant())
            .unwrap();
    }
}

/// Event collector for testing event emissions
#[derive(Clone)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn has_event_type(&self, check_fn: impl Fn(&SessionEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(check_fn)
    }
}

impl SessionEventHandler for EventCollector {
    fn handle_event(&self, event: &SessionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
