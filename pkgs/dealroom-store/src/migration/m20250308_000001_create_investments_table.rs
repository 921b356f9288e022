use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Investments {
    Table,
    Id,
    UserId,
    DealId,
    Status,
    Amount,
    Notes,
    UpdatedAt,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250308_000001_create_investments_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Investments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Investments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Investments::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Investments::DealId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Investments::Status)
                            .string_len(16)
                            .not_null()
                            .default("interested"),
                    )
                    .col(ColumnDef::new(Investments::Amount).double())
                    .col(
                        ColumnDef::new(Investments::Notes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Investments::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_investments_user_deal")
                    .table(Investments::Table)
                    .col(Investments::UserId)
                    .col(Investments::DealId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Investments::Table).to_owned())
            .await
    }
}
