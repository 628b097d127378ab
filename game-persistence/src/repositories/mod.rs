pub mod game_result_repository;
pub mod user_repository;

pub use game_result_repository::{GameResultRepository, InsertOutcome};
pub use user_repository::UserRepository;
