pub use super::game_results::Entity as GameResults;
pub use super::users::Entity as Users;
