//! Watchlist store - unique (user, deal) membership

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entities::watchlist;
use crate::{from_millis, now_millis, DealId, Result, StoreError, UserId};

/// A deal saved to a user's watchlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub user_id: UserId,
    pub deal_id: DealId,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<watchlist::Model> for WatchlistEntry {
    type Error = StoreError;

    fn try_from(model: watchlist::Model) -> Result<Self> {
        Ok(Self {
            user_id: model.user_id,
            deal_id: model.deal_id,
            created_at: from_millis(model.created_at)?,
        })
    }
}

/// Watchlist store
pub struct WatchlistStore {
    db: DatabaseConnection,
}

impl WatchlistStore {
    /// Create a new watchlist store
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Add a deal to the watchlist.
    ///
    /// Fails with [`StoreError::AlreadyInWatchlist`] when the pair exists,
    /// including when a concurrent add won the race.
    pub async fn add(&self, user_id: UserId, deal_id: DealId) -> Result<WatchlistEntry> {
        let created_at = now_millis();

        if !self.insert_if_absent(user_id, deal_id, created_at).await? {
            return Err(StoreError::AlreadyInWatchlist { user_id, deal_id });
        }

        info!("Deal {} added to watchlist of {}", deal_id, user_id);
        Ok(WatchlistEntry {
            user_id,
            deal_id,
            created_at: from_millis(created_at)?,
        })
    }

    /// Remove a deal from the watchlist. Returns whether a row was removed;
    /// removing an absent pair is not an error.
    pub async fn remove(&self, user_id: UserId, deal_id: DealId) -> Result<bool> {
        let result = watchlist::Entity::delete_many()
            .filter(watchlist::Column::UserId.eq(user_id))
            .filter(watchlist::Column::DealId.eq(deal_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            info!("Deal {} removed from watchlist of {}", deal_id, user_id);
        }
        Ok(result.rows_affected > 0)
    }

    /// Flip membership. Returns `true` when the deal is in the watchlist
    /// afterwards.
    pub async fn toggle(&self, user_id: UserId, deal_id: DealId) -> Result<bool> {
        if self.remove(user_id, deal_id).await? {
            return Ok(false);
        }

        // Losing an insert race still leaves the deal in the watchlist
        if self.insert_if_absent(user_id, deal_id, now_millis()).await? {
            info!("Deal {} added to watchlist of {}", deal_id, user_id);
        }
        Ok(true)
    }

    /// Whether the deal is in the user's watchlist
    pub async fn contains(&self, user_id: UserId, deal_id: DealId) -> Result<bool> {
        let count = watchlist::Entity::find()
            .filter(watchlist::Column::UserId.eq(user_id))
            .filter(watchlist::Column::DealId.eq(deal_id))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Watchlist of a user, most recently added first
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WatchlistEntry>> {
        let entries = watchlist::Entity::find()
            .filter(watchlist::Column::UserId.eq(user_id))
            .order_by_desc(watchlist::Column::CreatedAt)
            .order_by_desc(watchlist::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(WatchlistEntry::try_from)
            .collect::<Result<Vec<_>>>()?;

        debug!("Watchlist of {} has {} entries", user_id, entries.len());
        Ok(entries)
    }

    /// Number of entries in a user's watchlist
    pub async fn count(&self, user_id: UserId) -> Result<u64> {
        let count = watchlist::Entity::find()
            .filter(watchlist::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    /// Atomic insert-if-absent backed by the unique (user_id, deal_id) index.
    /// Returns whether a row was inserted.
    async fn insert_if_absent(
        &self,
        user_id: UserId,
        deal_id: DealId,
        created_at: i64,
    ) -> Result<bool> {
        let entry = watchlist::ActiveModel {
            user_id: Set(user_id),
            deal_id: Set(deal_id),
            created_at: Set(created_at),
            ..Default::default()
        };

        let result = watchlist::Entity::insert(entry)
            .on_conflict(
                OnConflict::columns([watchlist::Column::UserId, watchlist::Column::DealId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;

        match result {
            Ok(rows) => Ok(rows > 0),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
