use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dealroom_access::UserId;
use dealroom_store::{DealId, InvestmentStatus, Message, MessageId};
use serde::{Deserialize, Serialize};

use crate::providers::{ContentEntity, EntityStatus};

/// Send message request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub recipient_id: UserId,
    pub body: String,
    #[serde(default)]
    pub deal_id: Option<DealId>,
}

/// Thread fetch request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchMessagesRequest {
    pub counterparty_id: UserId,
    #[serde(default)]
    pub deal_id: Option<DealId>,
    #[serde(default)]
    pub since_id: Option<MessageId>,
}

/// Message as shown to one of its two parties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: MessageId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub recipient_id: UserId,
    pub deal_id: Option<DealId>,
    pub body: String,
    pub is_read: bool,
    pub is_mine: bool,
    pub created_at: DateTime<Utc>,
}

impl MessageView {
    pub fn new(message: Message, viewer: UserId, sender_name: &str) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            sender_name: sender_name.to_string(),
            recipient_id: message.recipient_id,
            deal_id: message.deal_id,
            body: message.body,
            is_read: message.is_read,
            is_mine: message.sender_id == viewer,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub message_ids: Vec<MessageId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Minimal deal identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealRef {
    pub id: DealId,
    pub title: String,
    pub permalink: String,
}

impl From<ContentEntity> for DealRef {
    fn from(entity: ContentEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            permalink: entity.permalink,
        }
    }
}

/// Conversation entry in the inbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub counterparty_id: UserId,
    pub counterparty_name: String,
    pub last_message: String,
    pub last_message_at: DateTime<Utc>,
    pub unread_count: u64,
    pub deal: Option<DealRef>,
}

/// Deal details shown in watchlists and comparisons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealSummary {
    pub id: DealId,
    pub title: String,
    pub permalink: String,
    pub status: EntityStatus,
    pub sector: Option<String>,
    pub organization_name: Option<String>,
    pub funding_ask: Option<String>,
    pub funding_stage: Option<String>,
    pub equity_offered: Option<String>,
    pub minimum_investment: Option<String>,
    pub location: Option<String>,
}

/// Meta keys read into a [`DealSummary`]
pub(crate) const SUMMARY_META_KEYS: [&str; 7] = [
    "sector",
    "organization_name",
    "funding_ask",
    "funding_stage",
    "equity_offered",
    "minimum_investment",
    "location",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    #[serde(flatten)]
    pub deal: DealSummary,
    pub added_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRequest {
    pub deal_id: DealId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub in_watchlist: bool,
}

/// Track investment request. `status` is parsed by the operation so an
/// unknown value surfaces as a validation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInvestmentRequest {
    pub deal_id: DealId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Tracker record joined with its deal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedInvestment {
    pub deal_id: DealId,
    pub title: String,
    pub organization_name: Option<String>,
    pub permalink: String,
    pub status: InvestmentStatus,
    pub amount: Option<f64>,
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}

/// Pipeline overview over the tracked deals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSummary {
    pub total_tracked: u64,
    pub by_status: BTreeMap<InvestmentStatus, u64>,
    /// Sum of all recorded amounts
    pub total_potential: f64,
    /// Sum of amounts in the committed stage
    pub total_committed: f64,
}

impl InvestmentSummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TrackedInvestment>,
    {
        let mut summary = InvestmentSummary {
            total_tracked: 0,
            by_status: InvestmentStatus::ALL.into_iter().map(|s| (s, 0)).collect(),
            total_potential: 0.0,
            total_committed: 0.0,
        };

        for record in records {
            summary.total_tracked += 1;
            *summary.by_status.entry(record.status).or_insert(0) += 1;

            if let Some(amount) = record.amount {
                summary.total_potential += amount;
                if record.status == InvestmentStatus::Committed {
                    summary.total_committed += amount;
                }
            }
        }

        summary
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveNotesRequest {
    pub deal_id: DealId,
    pub notes: String,
}
