use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum DealNotes {
    Table,
    Id,
    UserId,
    DealId,
    Notes,
    UpdatedAt,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250308_000002_create_deal_notes_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DealNotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DealNotes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DealNotes::UserId).big_integer().not_null())
                    .col(ColumnDef::new(DealNotes::DealId).big_integer().not_null())
                    .col(ColumnDef::new(DealNotes::Notes).text().not_null())
                    .col(ColumnDef::new(DealNotes::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_deal_notes_user_deal")
                    .table(DealNotes::Table)
                    .col(DealNotes::UserId)
                    .col(DealNotes::DealId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DealNotes::Table).to_owned())
            .await
    }
}
