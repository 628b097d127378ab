use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
};
use uuid::Uuid;

use crate::entities::{game_results, prelude::*};
use game_types::{GameResult, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A result for this player and date already exists; nothing was written.
    Duplicate,
}

pub struct GameResultRepository {
    db: DatabaseConnection,
}

impl GameResultRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_result(model: game_results::Model) -> GameResult {
        GameResult {
            player_id: model.player_id,
            final_score: model.final_score,
            game_date: model.game_date,
            completed_at: model.completed_at,
        }
    }

    /// Insert a completed game. Never overwrites an existing row.
    pub async fn insert_result(&self, result: &GameResult) -> Result<InsertOutcome> {
        let model = game_results::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            player_id: sea_orm::ActiveValue::Set(result.player_id),
            final_score: sea_orm::ActiveValue::Set(result.final_score),
            game_date: sea_orm::ActiveValue::Set(result.game_date),
            completed_at: sea_orm::ActiveValue::Set(result.completed_at),
        };

        match GameResults::insert(model).exec(&self.db).await {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(InsertOutcome::Duplicate),
                _ => Err(err.into()),
            },
        }
    }

    pub async fn has_played(&self, player_id: PlayerId, game_date: NaiveDate) -> Result<bool> {
        let count = GameResults::find()
            .filter(game_results::Column::PlayerId.eq(player_id))
            .filter(game_results::Column::GameDate.eq(game_date))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    pub async fn most_recent(&self, player_id: PlayerId) -> Result<Option<GameResult>> {
        let model = GameResults::find()
            .filter(game_results::Column::PlayerId.eq(player_id))
            .order_by_desc(game_results::Column::CompletedAt)
            .one(&self.db)
            .await?;

        Ok(model.map(Self::model_to_result))
    }

    /// Best score for a player, on one date or across all dates.
    pub async fn best_score(
        &self,
        player_id: PlayerId,
        game_date: Option<NaiveDate>,
    ) -> Result<Option<i32>> {
        let mut query = GameResults::find().filter(game_results::Column::PlayerId.eq(player_id));
        if let Some(date) = game_date {
            query = query.filter(game_results::Column::GameDate.eq(date));
        }

        let model = query
            .order_by_desc(game_results::Column::FinalScore)
            .one(&self.db)
            .await?;

        Ok(model.map(|model| model.final_score))
    }

    /// Every stored result, optionally restricted to one game date.
    pub async fn fetch_all(&self, game_date: Option<NaiveDate>) -> Result<Vec<GameResult>> {
        let mut query = GameResults::find();
        if let Some(date) = game_date {
            query = query.filter(game_results::Column::GameDate.eq(date));
        }

        let models = query
            .order_by_desc(game_results::Column::FinalScore)
            .order_by_asc(game_results::Column::CompletedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_result).collect())
    }
}
