mod common;

use common::*;
use game_types::SessionStatus;

#[test]
fn test_session_creation() {
    let session = create_session(create_ladder_board());
    assert_eq!(session.status(), SessionStatus::InProgress);
    assert_eq!(session.cumulative_score(), 0);
    assert_eq!(session.answered_count(), 0);
    assert_eq!(session.total_clues(), 5);
    assert!(session.open_clue().is_none());
}

#[test]
fn test_board_helpers() {
    let board = create_daily_double_board();
    assert_eq!(board.total_clues(), 3);
    assert_eq!(board.daily_double_count(), 1);
    assert_eq!(board.final_clue().id, 4);
}

#[test]
fn test_session_view_hides_answers() {
    let mut session = create_session(create_daily_double_board());
    session.open(1).unwrap();

    let view = session.view();
    assert_eq!(view.open_clue.as_ref().map(|clue| clue.id), Some(1));
    assert_eq!(view.total_clues, 3);

    let json = serde_json::to_string(&view).unwrap();
    assert!(!json.contains("Lynchburg"));
    assert!(!json.contains("IBM"));
}
