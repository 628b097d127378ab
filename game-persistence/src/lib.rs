pub mod connection;
pub mod entities;
pub mod repositories;
pub mod result_store;
pub mod retry;

pub use connection::*;
pub use repositories::{GameResultRepository, InsertOutcome, UserRepository};
pub use result_store::{ResultStore, SqlResultStore};
pub use retry::{RetryPolicy, read_until_visible};
