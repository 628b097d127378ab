use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use tracing::{error, info};

use crate::repositories::{GameResultRepository, InsertOutcome, UserRepository};
use game_types::{GameError, GameResult, PlayerId};

/// Where completed games go, and where the leaderboard reads them back from.
///
/// Every failure surfaces as `GameError::PersistenceFailure` so callers can
/// tell storage trouble apart from rule violations and offer a retry.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Store one completed game. A second result for the same player and
    /// date is rejected with `AlreadyPlayed`.
    async fn save(&self, result: &GameResult) -> Result<(), GameError>;

    async fn has_played(&self, player_id: PlayerId, game_date: NaiveDate)
    -> Result<bool, GameError>;

    async fn most_recent(&self, player_id: PlayerId) -> Result<Option<GameResult>, GameError>;

    async fn best_score(
        &self,
        player_id: PlayerId,
        game_date: Option<NaiveDate>,
    ) -> Result<Option<i32>, GameError>;

    async fn fetch_all(&self, game_date: Option<NaiveDate>) -> Result<Vec<GameResult>, GameError>;

    async fn display_names(
        &self,
        player_ids: &[PlayerId],
    ) -> Result<HashMap<PlayerId, String>, GameError>;
}

pub struct SqlResultStore {
    results: GameResultRepository,
    users: UserRepository,
}

impl SqlResultStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            results: GameResultRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }
}

fn persistence_failure(operation: &str, err: anyhow::Error) -> GameError {
    error!("Failed to {}: {:#}", operation, err);
    GameError::PersistenceFailure {
        message: format!("Failed to {}", operation),
    }
}

#[async_trait]
impl ResultStore for SqlResultStore {
    async fn save(&self, result: &GameResult) -> Result<(), GameError> {
        let outcome = self
            .results
            .insert_result(result)
            .await
            .map_err(|e| persistence_failure("save game result", e))?;

        match outcome {
            InsertOutcome::Inserted => {
                info!(
                    player_id = %result.player_id,
                    final_score = result.final_score,
                    game_date = %result.game_date,
                    "Game result saved"
                );
                Ok(())
            }
            InsertOutcome::Duplicate => Err(GameError::AlreadyPlayed {
                game_date: result.game_date.to_string(),
            }),
        }
    }

    async fn has_played(
        &self,
        player_id: PlayerId,
        game_date: NaiveDate,
    ) -> Result<bool, GameError> {
        self.results
            .has_played(player_id, game_date)
            .await
            .map_err(|e| persistence_failure("check play status", e))
    }

    async fn most_recent(&self, player_id: PlayerId) -> Result<Option<GameResult>, GameError> {
        self.results
            .most_recent(player_id)
            .await
            .map_err(|e| persistence_failure("load most recent game", e))
    }

    async fn best_score(
        &self,
        player_id: PlayerId,
        game_date: Option<NaiveDate>,
    ) -> Result<Option<i32>, GameError> {
        self.results
            .best_score(player_id, game_date)
            .await
            .map_err(|e| persistence_failure("load best score", e))
    }

    async fn fetch_all(&self, game_date: Option<NaiveDate>) -> Result<Vec<GameResult>, GameError> {
        self.results
            .fetch_all(game_date)
            .await
            .map_err(|e| persistence_failure("load game results", e))
    }

    async fn display_names(
        &self,
        player_ids: &[PlayerId],
    ) -> Result<HashMap<PlayerId, String>, GameError> {
        self.users
            .display_names(player_ids)
            .await
            .map_err(|e| persistence_failure("load display names", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use chrono::Utc;
    use game_types::User;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::ConnectionTrait;
    use uuid::Uuid;

    async fn setup_store() -> (SqlResultStore, DatabaseConnection) {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        (SqlResultStore::new(db.clone()), db)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 31).unwrap()
    }

    fn completed(player_id: PlayerId, final_score: i32) -> GameResult {
        GameResult {
            player_id,
            final_score,
            game_date: today(),
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_once_per_day() {
        let (store, _db) = setup_store().await;
        let player = Uuid::new_v4();

        store.save(&completed(player, 4000)).await.unwrap();
        assert!(store.has_played(player, today()).await.unwrap());

        let second = store.save(&completed(player, 100)).await;
        assert_eq!(
            second,
            Err(GameError::AlreadyPlayed {
                game_date: "2025-10-31".to_string()
            })
        );
        assert_eq!(store.best_score(player, Some(today())).await.unwrap(), Some(4000));
        assert_eq!(
            store.most_recent(player).await.unwrap().map(|r| r.final_score),
            Some(4000)
        );
    }

    #[tokio::test]
    async fn test_display_names_come_from_users() {
        let (store, db) = setup_store().await;
        let player = Uuid::new_v4();

        UserRepository::new(db)
            .upsert_user(User {
                id: player,
                email: "quiz@example.com".to_string(),
                display_name: "Quiz Whiz".to_string(),
                image: None,
                created_at: Utc::now().to_rfc3339(),
            })
            .await
            .unwrap();

        let names = store.display_names(&[player, Uuid::new_v4()]).await.unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names[&player], "Quiz Whiz");
    }

    #[tokio::test]
    async fn test_storage_failure_is_retryable() {
        let (store, db) = setup_store().await;
        db.execute_unprepared("DROP TABLE game_results").await.unwrap();

        let err = store.fetch_all(None).await.unwrap_err();
        assert!(matches!(err, GameError::PersistenceFailure { .. }));
        assert!(err.is_retryable());
    }
}
