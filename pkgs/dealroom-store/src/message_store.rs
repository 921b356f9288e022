//! Message store - append-only message log with read/unread state

use chrono::{DateTime, Utc};
use sea_orm::{
    prelude::Expr, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entities::messages;
use crate::{from_millis, now_millis, DealId, Result, StoreError, UserId};

pub type MessageId = i64;

/// Ids bound per UPDATE, well under SQLite's host parameter limit
const MARK_READ_BATCH: usize = 500;

/// A persisted message between two users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub deal_id: Option<DealId>,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The other party of this message as seen by `viewer`
    pub fn counterparty(&self, viewer: UserId) -> UserId {
        if self.sender_id == viewer {
            self.recipient_id
        } else {
            self.sender_id
        }
    }

    /// Sort key for conversation order
    pub fn order_key(&self) -> (DateTime<Utc>, MessageId) {
        (self.created_at, self.id)
    }

    pub fn is_unread_for(&self, viewer: UserId) -> bool {
        self.recipient_id == viewer && !self.is_read
    }
}

impl TryFrom<messages::Model> for Message {
    type Error = StoreError;

    fn try_from(model: messages::Model) -> Result<Self> {
        Ok(Self {
            id: model.id,
            sender_id: model.sender_id,
            recipient_id: model.recipient_id,
            deal_id: model.deal_id,
            body: model.body,
            is_read: model.is_read,
            created_at: from_millis(model.created_at)?,
        })
    }
}

/// A message about to be appended to the log
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub deal_id: Option<DealId>,
    pub body: String,
}

/// Optional narrowing of a two-party thread
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadFilter {
    /// Only messages attached to this deal
    pub deal_id: Option<DealId>,
    /// Only messages with an id greater than this (incremental polling)
    pub since_id: Option<MessageId>,
}

/// Message store - manages the persistent message log
pub struct MessageStore {
    db: DatabaseConnection,
}

impl MessageStore {
    /// Create a new message store
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append a message. The row is written by a single insert, so it is
    /// either fully visible or not at all.
    pub async fn insert(&self, new: NewMessage) -> Result<Message> {
        let created_at = now_millis();

        let model = messages::ActiveModel {
            id: NotSet,
            sender_id: Set(new.sender_id),
            recipient_id: Set(new.recipient_id),
            deal_id: Set(new.deal_id),
            body: Set(new.body.clone()),
            is_read: Set(false),
            read_at: Set(None),
            created_at: Set(created_at),
        };

        let result = messages::Entity::insert(model).exec(&self.db).await?;

        info!(
            "Stored message {} from {} to {}",
            result.last_insert_id, new.sender_id, new.recipient_id
        );

        Ok(Message {
            id: result.last_insert_id,
            sender_id: new.sender_id,
            recipient_id: new.recipient_id,
            deal_id: new.deal_id,
            body: new.body,
            is_read: false,
            created_at: from_millis(created_at)?,
        })
    }

    /// Get message by ID
    pub async fn get(&self, id: MessageId) -> Result<Option<Message>> {
        messages::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Message::try_from)
            .transpose()
    }

    /// Messages exchanged between `viewer` and `counterparty` in either
    /// direction, oldest first. Pure read.
    pub async fn list_between(
        &self,
        viewer: UserId,
        counterparty: UserId,
        filter: ThreadFilter,
    ) -> Result<Vec<Message>> {
        let query = messages::Entity::find().filter(thread(viewer, counterparty, filter));

        let rows = query
            .order_by_asc(messages::Column::CreatedAt)
            .order_by_asc(messages::Column::Id)
            .all(&self.db)
            .await?;

        let messages = rows
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Retrieved {} messages between {} and {}",
            messages.len(),
            viewer,
            counterparty
        );
        Ok(messages)
    }

    /// Read a thread and acknowledge it.
    ///
    /// Returns the same messages as [`list_between`](Self::list_between),
    /// with `is_read` as it was when read, then marks every returned message
    /// addressed to `viewer` as read. Viewing a thread counts as reading it.
    pub async fn fetch_and_acknowledge(
        &self,
        viewer: UserId,
        counterparty: UserId,
        filter: ThreadFilter,
    ) -> Result<Vec<Message>> {
        let messages = self.list_between(viewer, counterparty, filter).await?;

        if let Some(last_id) = messages
            .iter()
            .filter(|m| m.is_unread_for(viewer))
            .map(|m| m.id)
            .max()
        {
            // Same rows the read returned; later arrivals have larger ids
            let result = messages::Entity::update_many()
                .col_expr(messages::Column::IsRead, Expr::value(true))
                .col_expr(messages::Column::ReadAt, Expr::value(now_millis()))
                .filter(thread(viewer, counterparty, filter))
                .filter(messages::Column::Id.lte(last_id))
                .filter(messages::Column::RecipientId.eq(viewer))
                .filter(messages::Column::IsRead.eq(false))
                .exec(&self.db)
                .await?;

            debug!(
                "Acknowledged {} messages from {} for {}",
                result.rows_affected, counterparty, viewer
            );
        }

        Ok(messages)
    }

    /// Mark messages as read on behalf of `viewer`.
    ///
    /// Only ids addressed to `viewer` that are still unread are touched; the
    /// rest are skipped. Returns the number of messages actually updated.
    pub async fn mark_read(&self, ids: &[MessageId], viewer: UserId) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let read_at = now_millis();
        let mut updated = 0;

        for chunk in ids.chunks(MARK_READ_BATCH) {
            let result = messages::Entity::update_many()
                .col_expr(messages::Column::IsRead, Expr::value(true))
                .col_expr(messages::Column::ReadAt, Expr::value(read_at))
                .filter(messages::Column::Id.is_in(chunk.iter().copied()))
                .filter(messages::Column::RecipientId.eq(viewer))
                .filter(messages::Column::IsRead.eq(false))
                .exec(&self.db)
                .await?;
            updated += result.rows_affected;
        }

        debug!(
            "Marked {} of {} messages as read for {}",
            updated,
            ids.len(),
            viewer
        );
        Ok(updated)
    }

    /// Number of unread messages addressed to `viewer`
    pub async fn count_unread(&self, viewer: UserId) -> Result<u64> {
        let count = messages::Entity::find()
            .filter(messages::Column::RecipientId.eq(viewer))
            .filter(messages::Column::IsRead.eq(false))
            .count(&self.db)
            .await?;

        debug!("Unread messages for {}: {}", viewer, count);
        Ok(count)
    }

    /// Every message `user` sent or received, oldest first
    pub async fn involving(&self, user: UserId) -> Result<Vec<Message>> {
        messages::Entity::find()
            .filter(
                Condition::any()
                    .add(messages::Column::SenderId.eq(user))
                    .add(messages::Column::RecipientId.eq(user)),
            )
            .order_by_asc(messages::Column::CreatedAt)
            .order_by_asc(messages::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Message::try_from)
            .collect()
    }
}

/// Messages of the `viewer`/`counterparty` pair in either direction,
/// narrowed by `filter`
fn thread(viewer: UserId, counterparty: UserId, filter: ThreadFilter) -> Condition {
    let mut condition = Condition::all().add(
        Condition::any()
            .add(
                Condition::all()
                    .add(messages::Column::SenderId.eq(viewer))
                    .add(messages::Column::RecipientId.eq(counterparty)),
            )
            .add(
                Condition::all()
                    .add(messages::Column::SenderId.eq(counterparty))
                    .add(messages::Column::RecipientId.eq(viewer)),
            ),
    );

    if let Some(deal_id) = filter.deal_id {
        condition = condition.add(messages::Column::DealId.eq(deal_id));
    }
    if let Some(since_id) = filter.since_id {
        condition = condition.add(messages::Column::Id.gt(since_id));
    }
    condition
}
