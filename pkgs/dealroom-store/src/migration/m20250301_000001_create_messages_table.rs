use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Messages {
    Table,
    Id,
    SenderId,
    RecipientId,
    DealId,
    Body,
    IsRead,
    ReadAt,
    CreatedAt,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000001_create_messages_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Messages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Messages::SenderId).big_integer().not_null())
                    .col(ColumnDef::new(Messages::RecipientId).big_integer().not_null())
                    .col(ColumnDef::new(Messages::DealId).big_integer())
                    .col(ColumnDef::new(Messages::Body).text().not_null())
                    .col(
                        ColumnDef::new(Messages::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Messages::ReadAt).big_integer())
                    .col(ColumnDef::new(Messages::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        let indexes = [
            ("idx_messages_sender", Messages::SenderId),
            ("idx_messages_recipient", Messages::RecipientId),
            ("idx_messages_deal", Messages::DealId),
            ("idx_messages_created_at", Messages::CreatedAt),
        ];

        for (name, column) in indexes {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Messages::Table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        // Unread badge lookups filter on both columns
        manager
            .create_index(
                Index::create()
                    .name("idx_messages_recipient_unread")
                    .table(Messages::Table)
                    .col(Messages::RecipientId)
                    .col(Messages::IsRead)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await
    }
}
