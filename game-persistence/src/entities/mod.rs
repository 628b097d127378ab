pub mod prelude;

pub mod game_results;
pub mod users;
