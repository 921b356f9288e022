//! Activity log - append-only audit trail of user actions
//!
//! Recording is a side effect of the primary operation. Callers log
//! failures from [`ActivityLogger::record`] and carry on; the action being
//! audited is never undone because its log entry could not be written.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::activity_log;
use crate::{from_millis, now_millis, Result, UserId};

/// Recorded user action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    SendMessage,
    AddToWatchlist,
    RemoveFromWatchlist,
    TrackInvestment,
    SaveNotes,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::SendMessage => "send_message",
            ActivityAction::AddToWatchlist => "add_to_watchlist",
            ActivityAction::RemoveFromWatchlist => "remove_from_watchlist",
            ActivityAction::TrackInvestment => "track_investment",
            ActivityAction::SaveNotes => "save_notes",
        }
    }

    /// Kind of object the action's `object_id` refers to
    pub fn object_type(&self) -> &'static str {
        match self {
            ActivityAction::SendMessage => "message",
            _ => "deal",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry about to be recorded
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user_id: UserId,
    pub action: ActivityAction,
    pub object_id: Option<i64>,
    pub details: Option<serde_json::Value>,
}

impl NewActivity {
    pub fn new(user_id: UserId, action: ActivityAction, object_id: i64) -> Self {
        Self {
            user_id,
            action,
            object_id: Some(object_id),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Recorded entry as read back from the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: i64,
    pub user_id: UserId,
    pub action: String,
    pub object_type: String,
    pub object_id: Option<i64>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<activity_log::Model> for ActivityEntry {
    type Error = crate::StoreError;

    fn try_from(model: activity_log::Model) -> Result<Self> {
        let details = model
            .details
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            action: model.action,
            object_type: model.object_type,
            object_id: model.object_id,
            details,
            created_at: from_millis(model.created_at)?,
        })
    }
}

/// Sink for activity entries
#[async_trait]
pub trait ActivityLogger: Send + Sync {
    async fn record(&self, entry: NewActivity) -> Result<()>;
}

/// Database-backed activity log
pub struct ActivityLog {
    db: DatabaseConnection,
}

impl ActivityLog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Most recent entries of a user, newest first
    pub async fn for_user(&self, user_id: UserId, limit: u64) -> Result<Vec<ActivityEntry>> {
        activity_log::Entity::find()
            .filter(activity_log::Column::UserId.eq(user_id))
            .order_by_desc(activity_log::Column::CreatedAt)
            .order_by_desc(activity_log::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(ActivityEntry::try_from)
            .collect()
    }
}

#[async_trait]
impl ActivityLogger for ActivityLog {
    async fn record(&self, entry: NewActivity) -> Result<()> {
        let details = entry
            .details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let row = activity_log::ActiveModel {
            id: NotSet,
            user_id: Set(entry.user_id),
            action: Set(entry.action.as_str().to_string()),
            object_type: Set(entry.action.object_type().to_string()),
            object_id: Set(entry.object_id),
            details: Set(details),
            created_at: Set(now_millis()),
        };

        activity_log::Entity::insert(row).exec(&self.db).await?;

        debug!(
            "Activity {} by {} on {:?}",
            entry.action, entry.user_id, entry.object_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(ActivityAction::SendMessage.as_str(), "send_message");
        assert_eq!(ActivityAction::SendMessage.object_type(), "message");
        assert_eq!(ActivityAction::TrackInvestment.object_type(), "deal");
        assert_eq!(
            serde_json::to_string(&ActivityAction::RemoveFromWatchlist).unwrap(),
            "\"remove_from_watchlist\""
        );
    }

    #[test]
    fn test_new_activity_builder() {
        let entry = NewActivity::new(3, ActivityAction::SaveNotes, 42)
            .with_details(serde_json::json!({ "length": 12 }));
        assert_eq!(entry.object_id, Some(42));
        assert_eq!(entry.details.unwrap()["length"], 12);
    }
}
