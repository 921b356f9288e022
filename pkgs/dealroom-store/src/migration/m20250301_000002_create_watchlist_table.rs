use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Watchlist {
    Table,
    Id,
    UserId,
    DealId,
    CreatedAt,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000002_create_watchlist_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Watchlist::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Watchlist::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Watchlist::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Watchlist::DealId).big_integer().not_null())
                    .col(ColumnDef::new(Watchlist::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watchlist_user_deal")
                    .table(Watchlist::Table)
                    .col(Watchlist::UserId)
                    .col(Watchlist::DealId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watchlist_created_at")
                    .table(Watchlist::Table)
                    .col(Watchlist::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Watchlist::Table).to_owned())
            .await
    }
}
