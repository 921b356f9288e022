use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum ActivityLog {
    Table,
    Id,
    UserId,
    Action,
    ObjectType,
    ObjectId,
    Details,
    CreatedAt,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000003_create_activity_log_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityLog::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivityLog::UserId).big_integer().not_null())
                    .col(ColumnDef::new(ActivityLog::Action).string_len(100).not_null())
                    .col(ColumnDef::new(ActivityLog::ObjectType).string_len(50).not_null())
                    .col(ColumnDef::new(ActivityLog::ObjectId).big_integer())
                    .col(ColumnDef::new(ActivityLog::Details).text())
                    .col(ColumnDef::new(ActivityLog::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_user")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_action_type")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::Action)
                    .col(ActivityLog::ObjectType)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLog::Table).to_owned())
            .await
    }
}
