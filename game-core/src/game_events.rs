use game_types::{ClueAttempt, ClueId, GameResult, PlayerId};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SessionStarted {
        player_id: PlayerId,
        total_clues: usize,
    },
    ClueOpened {
        player_id: PlayerId,
        clue_id: ClueId,
        requires_wager: bool,
    },
    WagerAccepted {
        player_id: PlayerId,
        clue_id: ClueId,
        wager: i32,
    },
    ClueAnswered {
        player_id: PlayerId,
        attempt: ClueAttempt,
        cumulative_score: i32,
    },
    FinalRoundReady {
        player_id: PlayerId,
        cumulative_score: i32,
    },
    FinalWagerAccepted {
        player_id: PlayerId,
        wager: i32,
    },
    GameCompleted {
        result: GameResult,
    },
}

impl SessionEvent {
    pub fn player_id(&self) -> PlayerId {
        match self {
            SessionEvent::SessionStarted { player_id, .. } => *player_id,
            SessionEvent::ClueOpened { player_id, .. } => *player_id,
            SessionEvent::WagerAccepted { player_id, .. } => *player_id,
            SessionEvent::ClueAnswered { player_id, .. } => *player_id,
            SessionEvent::FinalRoundReady { player_id, .. } => *player_id,
            SessionEvent::FinalWagerAccepted { player_id, .. } => *player_id,
            SessionEvent::GameCompleted { result } => result.player_id,
        }
    }
}

/// Event handler trait for processing session events
pub trait SessionEventHandler: Send + Sync {
    fn handle_event(&self, event: &SessionEvent);
}

/// Simple event bus for distributing session events
pub struct SessionEventBus {
    handlers: Vec<Box<dyn SessionEventHandler>>,
}

impl SessionEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn SessionEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn publish(&self, event: &SessionEvent) {
        for handler in &self.handlers {
            handler.handle_event(event);
        }
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = SessionEvent>) {
        for event in events {
            self.publish(&event);
        }
    }
}

impl Default for SessionEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    struct TestHandler {
        events: Arc<Mutex<Vec<SessionEvent>>>,
    }

    impl SessionEventHandler for TestHandler {
        fn handle_event(&self, event: &SessionEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn test_event_bus_delivers_to_every_handler() {
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));

        let mut bus = SessionEventBus::new();
        bus.add_handler(Box::new(TestHandler { events: first.clone() }));
        bus.add_handler(Box::new(TestHandler { events: second.clone() }));

        let player_id = Uuid::new_v4();
        bus.publish_all(vec![
            SessionEvent::SessionStarted {
                player_id,
                total_clues: 15,
            },
            SessionEvent::FinalWagerAccepted {
                player_id,
                wager: 500,
            },
        ]);

        assert_eq!(first.lock().unwrap().len(), 2);
        assert_eq!(second.lock().unwrap().len(), 2);
        assert_eq!(first.lock().unwrap()[1].player_id(), player_id);
    }
}
