//! Conversation store - per-counterparty view derived from the message log
//!
//! Conversations are not persisted. Every call reads the viewer's messages in
//! one query and groups them by the other party, so the unread counts and the
//! last message of each conversation come from the same snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::message_store::{Message, MessageStore};
use crate::{Result, UserId};

/// Conversation as seen by one viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub counterparty_id: UserId,
    pub last_message: Message,
    /// Messages from the counterparty the viewer has not read yet
    pub unread_count: u64,
    pub message_count: u64,
}

impl ConversationSummary {
    pub fn last_message_at(&self) -> DateTime<Utc> {
        self.last_message.created_at
    }
}

/// Conversation store
pub struct ConversationStore {
    messages: MessageStore,
}

impl ConversationStore {
    /// Create a new conversation store
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            messages: MessageStore::new(db),
        }
    }

    /// All conversations of `viewer`, most recent first
    pub async fn list_conversations(&self, viewer: UserId) -> Result<Vec<ConversationSummary>> {
        let messages = self.messages.involving(viewer).await?;
        let conversations = aggregate(viewer, messages);

        debug!(
            "Derived {} conversations for {}",
            conversations.len(),
            viewer
        );
        Ok(conversations)
    }
}

/// Group `messages` by the other party of `viewer`.
///
/// The last message of a group is the greatest by `(created_at, id)`.
/// Conversations are ordered by that key, descending.
pub fn aggregate<I>(viewer: UserId, messages: I) -> Vec<ConversationSummary>
where
    I: IntoIterator<Item = Message>,
{
    let mut by_counterparty: HashMap<UserId, ConversationSummary> = HashMap::new();

    for message in messages {
        let counterparty = message.counterparty(viewer);
        let unread = message.is_unread_for(viewer) && message.sender_id == counterparty;

        match by_counterparty.get_mut(&counterparty) {
            Some(summary) => {
                summary.message_count += 1;
                if unread {
                    summary.unread_count += 1;
                }
                if message.order_key() > summary.last_message.order_key() {
                    summary.last_message = message;
                }
            }
            None => {
                by_counterparty.insert(
                    counterparty,
                    ConversationSummary {
                        counterparty_id: counterparty,
                        last_message: message,
                        unread_count: u64::from(unread),
                        message_count: 1,
                    },
                );
            }
        }
    }

    let mut conversations: Vec<ConversationSummary> = by_counterparty.into_values().collect();
    conversations.sort_by(|a, b| b.last_message.order_key().cmp(&a.last_message.order_key()));
    conversations
}
