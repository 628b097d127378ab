use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GameResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameResults::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GameResults::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(GameResults::FinalScore).integer().not_null())
                    .col(ColumnDef::new(GameResults::GameDate).date().not_null())
                    .col(
                        ColumnDef::new(GameResults::CompletedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // One completed game per player per day
        manager
            .create_index(
                Index::create()
                    .name("idx_game_results_player_date")
                    .table(GameResults::Table)
                    .col(GameResults::PlayerId)
                    .col(GameResults::GameDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create index on final_score for leaderboard queries
        manager
            .create_index(
                Index::create()
                    .name("idx_game_results_final_score")
                    .table(GameResults::Table)
                    .col(GameResults::FinalScore)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_results_game_date")
                    .table(GameResults::Table)
                    .col(GameResults::GameDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GameResults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GameResults {
    Table,
    Id,
    PlayerId,
    FinalScore,
    GameDate,
    CompletedAt,
}
