mod common;

use chrono::{TimeZone, Utc};
use common::*;
use game_core::{OpenOutcome, SessionEvent, SessionEventBus, SessionPhase};
use game_types::{AttemptOutcome, GameError, SessionStatus};

#[test]
fn test_full_game_on_ladder_board() {
    let mut session = create_session(create_ladder_board());

    clear_ladder_board(&mut session);
    assert_eq!(session.cumulative_score(), 3000);
    assert_eq!(session.status(), SessionStatus::FinalRoundPending);
    assert_eq!(session.max_wager(), Some(3000));

    session.place_final_wager(1000).unwrap();
    assert_eq!(session.status(), SessionStatus::FinalRoundInProgress);
    assert_eq!(session.final_wager(), Some(1000));

    let completed_at = Utc.with_ymd_and_hms(2025, 10, 31, 19, 0, 0).unwrap();
    let completion = session.settle_final_round("ibm", completed_at).unwrap();

    assert!(completion.correct);
    assert_eq!(completion.result.final_score, 4000);
    assert_eq!(completion.result.game_date, game_date());
    assert_eq!(completion.result.completed_at, completed_at);
    assert_eq!(session.status(), SessionStatus::Completed);
    assert_eq!(session.result(), Some(&completion.result));
}

#[test]
fn test_time_decay_and_misses_accumulate() {
    let mut session = create_session(create_ladder_board());

    session.open(3).unwrap();
    let attempt = session.answer("What is answer 3?", seconds(1.0)).unwrap();
    assert_eq!(attempt.outcome, AttemptOutcome::Correct);
    assert_eq!(attempt.points_delta, 560);

    session.open(5).unwrap();
    let attempt = session.answer("something else", seconds(2.0)).unwrap();
    assert_eq!(attempt.outcome, AttemptOutcome::Incorrect);
    assert_eq!(attempt.points_delta, -1000);

    session.open(1).unwrap();
    let attempt = session.skip(seconds(9.0)).unwrap();
    assert_eq!(attempt.outcome, AttemptOutcome::Skipped);
    assert_eq!(attempt.points_delta, 0);
    assert!(attempt.submitted_answer.is_none());

    session.open(2).unwrap();
    let attempt = session.answer("answer 2", seconds(20.0)).unwrap();
    assert_eq!(attempt.outcome, AttemptOutcome::Correct);
    assert_eq!(attempt.points_delta, 0);

    assert_eq!(session.cumulative_score(), -440);
    assert_eq!(session.attempts().len(), 4);
    assert_eq!(session.answered_count(), 4);
}

#[test]
fn test_blank_answer_is_incorrect() {
    let mut session = create_session(create_ladder_board());
    session.open(1).unwrap();

    let attempt = session.answer("   ", instant()).unwrap();
    assert_eq!(attempt.outcome, AttemptOutcome::Incorrect);
    assert_eq!(session.cumulative_score(), -200);
}

#[test]
fn test_daily_double_flow() {
    let mut session = create_session(create_daily_double_board());

    match session.open(3).unwrap() {
        OpenOutcome::Opened(clue) => assert!(clue.is_wager_clue),
        other => panic!("Expected the daily double to open, got {:?}", other),
    }
    assert_eq!(session.max_wager(), Some(2000));

    assert_eq!(session.answer("Ann Arbor", instant()), Err(GameError::WagerRequired));
    assert_eq!(session.skip(instant()), Err(GameError::SkipNotAllowed));
    assert_eq!(
        session.place_wager(2001),
        Err(GameError::InvalidWager {
            wager: 2001,
            max_wager: 2000
        })
    );
    assert_eq!(
        session.place_wager(-1),
        Err(GameError::InvalidWager {
            wager: -1,
            max_wager: 2000
        })
    );

    session.place_wager(1500).unwrap();
    assert_eq!(session.open_clue_wager(), Some(1500));
    assert!(session.place_wager(1000).is_err());
    assert_eq!(session.skip(instant()), Err(GameError::SkipNotAllowed));

    // 1500 / 15 = 100 points per second
    let attempt = session.answer("what is ann arbor", seconds(3.0)).unwrap();
    assert_eq!(attempt.wager_amount, Some(1500));
    assert_eq!(attempt.points_delta, 1200);
    assert_eq!(session.cumulative_score(), 1200);
}

#[test]
fn test_daily_double_miss_costs_the_wager() {
    let mut session = create_session(create_daily_double_board());
    session.open(3).unwrap();
    session.place_wager(2000).unwrap();

    let attempt = session.answer("Kalamazoo", instant()).unwrap();
    assert_eq!(attempt.points_delta, -2000);
    assert_eq!(session.cumulative_score(), -2000);
}

#[test]
fn test_daily_double_ceiling_follows_score() {
    let mut session = create_session(create_daily_double_board());

    session.open(2).unwrap();
    session.answer("Dublin", instant()).unwrap();
    session.open(1).unwrap();
    session.answer("Lynchburg", instant()).unwrap();
    assert_eq!(session.cumulative_score(), 600);

    session.open(3).unwrap();
    assert_eq!(session.max_wager(), Some(2000));
}

#[test]
fn test_open_rules() {
    let mut session = create_session(create_ladder_board());

    assert_eq!(
        session.open(42).unwrap_err(),
        GameError::ClueNotFound { clue_id: 42 }
    );

    session.open(1).unwrap();
    // Same clue again is harmless
    assert!(matches!(session.open(1).unwrap(), OpenOutcome::Opened(_)));
    assert_eq!(
        session.open(2).unwrap_err(),
        GameError::ClueAlreadyOpen { clue_id: 1 }
    );

    session.answer("answer 1", instant()).unwrap();
    let score = session.cumulative_score();

    assert!(matches!(session.open(1).unwrap(), OpenOutcome::AlreadyAnswered));
    assert!(session.open_clue().is_none());
    assert_eq!(session.cumulative_score(), score);
    assert_eq!(session.answer("answer 1", instant()), Err(GameError::ClueNotOpen));
}

#[test]
fn test_final_round_requires_cleared_board() {
    let mut session = create_session(create_ladder_board());

    assert!(matches!(
        session.place_final_wager(100),
        Err(GameError::InvalidSessionState { .. })
    ));
    assert!(matches!(
        session.settle_final_round("IBM", Utc::now()),
        Err(GameError::InvalidSessionState { .. })
    ));
}

#[test]
fn test_final_round_wager_limits() {
    let mut session = create_session(create_ladder_board());
    for id in 1..=5u32 {
        session.open(id).unwrap();
        session.answer("wrong", instant()).unwrap();
    }
    assert_eq!(session.cumulative_score(), -3000);
    assert_eq!(session.max_wager(), Some(2000));

    assert!(matches!(
        session.place_final_wager(2500),
        Err(GameError::InvalidWager { .. })
    ));
    assert_eq!(session.status(), SessionStatus::FinalRoundPending);

    session.place_final_wager(2000).unwrap();
    let completion = session.settle_final_round("IBM", Utc::now()).unwrap();
    assert_eq!(completion.result.final_score, -1000);
}

#[test]
fn test_completion_happens_once() {
    let mut session = create_session(create_ladder_board());
    clear_ladder_board(&mut session);
    session.place_final_wager(500).unwrap();

    let completion = session.settle_final_round("Apple", Utc::now()).unwrap();
    assert!(!completion.correct);
    assert_eq!(completion.result.final_score, 2500);

    assert_eq!(
        session.settle_final_round("IBM", Utc::now()),
        Err(GameError::DuplicateCompletion)
    );
    assert_eq!(session.place_final_wager(100), Err(GameError::DuplicateCompletion));
    assert!(matches!(
        session.open(1),
        Err(GameError::InvalidSessionState { .. })
    ));
    assert_eq!(session.result().map(|r| r.final_score), Some(2500));
}

#[test]
fn test_empty_board_goes_straight_to_final_round() {
    let session = create_session(create_empty_board());
    assert_eq!(session.status(), SessionStatus::FinalRoundPending);
    assert_eq!(session.max_wager(), Some(2000));
}

#[test]
fn test_events_published_through_bus() {
    let collector = EventCollector::new();
    let mut bus = SessionEventBus::new();
    bus.add_handler(Box::new(collector.clone()));

    let mut session = create_session(create_daily_double_board());
    session.open(3).unwrap();
    session.place_wager(100).unwrap();
    session.answer("Ann Arbor", instant()).unwrap();
    bus.publish_all(session.drain_events());

    assert_eq!(collector.event_count(), 4);
    assert!(collector.has_event_type(|event| matches!(event, SessionEvent::SessionStarted { total_clues: 3, .. })));
    assert!(collector.has_event_type(|event| matches!(event, SessionEvent::WagerAccepted { wager: 100, .. })));
    assert!(collector.has_event_type(|event| matches!(event, SessionEvent::ClueAnswered { cumulative_score: 100, .. })));
    assert!(session.drain_events().is_empty());

    session.open(1).unwrap();
    session.answer("Lynchburg", instant()).unwrap();
    session.open(2).unwrap();
    session.answer("Dublin", instant()).unwrap();
    session.place_final_wager(0).unwrap();
    session.settle_final_round("IBM", Utc::now()).unwrap();
    bus.publish_all(session.drain_events());

    let events = collector.get_events();
    assert!(events.iter().any(|event| matches!(event, SessionEvent::FinalRoundReady { cumulative_score: 700, .. })));
    assert!(matches!(
        events.last(),
        Some(SessionEvent::GameCompleted { result }) if result.final_score == 700
    ));
    assert!(matches!(session.phase(), SessionPhase::Completed { .. }));
}
