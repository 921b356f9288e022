//! Sea-ORM migrations for dealroom-store database schema

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_messages_table;
mod m20250301_000002_create_watchlist_table;
mod m20250301_000003_create_activity_log_table;
mod m20250308_000001_create_investments_table;
mod m20250308_000002_create_deal_notes_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_messages_table::Migration),
            Box::new(m20250301_000002_create_watchlist_table::Migration),
            Box::new(m20250301_000003_create_activity_log_table::Migration),
            Box::new(m20250308_000001_create_investments_table::Migration),
            Box::new(m20250308_000002_create_deal_notes_table::Migration),
        ]
    }
}
