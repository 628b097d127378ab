pub mod answer_matching;
pub mod board;
pub mod final_round;
pub mod game_events;
pub mod game_session;
pub mod leaderboard;
pub mod scoring;
pub mod wager;

// Re-export main components
pub use answer_matching::*;
pub use board::*;
pub use final_round::*;
pub use game_events::*;
pub use game_session::*;
pub use leaderboard::*;
pub use scoring::*;
pub use wager::*;
