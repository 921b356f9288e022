//! Private per-user notes on deals

use std::collections::HashMap;

use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::debug;

use crate::entities::deal_notes;
use crate::{now_millis, DealId, Result, UserId};

/// Deal notes store
pub struct DealNotesStore {
    db: DatabaseConnection,
}

impl DealNotesStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Replace the user's notes on a deal
    pub async fn save(&self, user_id: UserId, deal_id: DealId, notes: &str) -> Result<()> {
        let row = deal_notes::ActiveModel {
            user_id: Set(user_id),
            deal_id: Set(deal_id),
            notes: Set(notes.to_string()),
            updated_at: Set(now_millis()),
            ..Default::default()
        };

        deal_notes::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([deal_notes::Column::UserId, deal_notes::Column::DealId])
                    .update_columns([deal_notes::Column::Notes, deal_notes::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        debug!("Saved notes of {} on deal {}", user_id, deal_id);
        Ok(())
    }

    pub async fn get(&self, user_id: UserId, deal_id: DealId) -> Result<Option<String>> {
        let row = deal_notes::Entity::find()
            .filter(deal_notes::Column::UserId.eq(user_id))
            .filter(deal_notes::Column::DealId.eq(deal_id))
            .one(&self.db)
            .await?;

        Ok(row.map(|r| r.notes))
    }

    /// All notes of a user keyed by deal
    pub async fn for_user(&self, user_id: UserId) -> Result<HashMap<DealId, String>> {
        let rows = deal_notes::Entity::find()
            .filter(deal_notes::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|r| (r.deal_id, r.notes)).collect())
    }
}
