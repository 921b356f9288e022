//! Collaborators the operations depend on but do not own.
//!
//! The identity provider knows who users are, the content store holds deal
//! entities and their metadata, and the notifier delivers mail. Each is a
//! trait object injected into [`DealRoomState`](crate::DealRoomState).

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use dealroom_access::{Capability, Role, UserId};
use dealroom_store::DealId;
use serde::{Deserialize, Serialize};

/// Account as known to the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

/// Resolves users and answers capability checks
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn find_user(&self, id: UserId) -> anyhow::Result<Option<UserProfile>>;

    fn has_capability(&self, user: &UserProfile, capability: Capability) -> bool {
        user.role.has_capability(capability)
    }
}

/// Publication state of a content entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Publish,
    Pending,
    Draft,
    Private,
    Trash,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Publish => "publish",
            EntityStatus::Pending => "pending",
            EntityStatus::Draft => "draft",
            EntityStatus::Private => "private",
            EntityStatus::Trash => "trash",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "publish" => Ok(EntityStatus::Publish),
            "pending" => Ok(EntityStatus::Pending),
            "draft" => Ok(EntityStatus::Draft),
            "private" => Ok(EntityStatus::Private),
            "trash" => Ok(EntityStatus::Trash),
            other => Err(anyhow::anyhow!("unknown entity status: {}", other)),
        }
    }
}

/// Entity held by the content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntity {
    pub id: DealId,
    pub entity_type: String,
    pub title: String,
    pub status: EntityStatus,
    pub permalink: String,
}

/// Generic entity store with key/value metadata
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get_entity(&self, id: DealId) -> anyhow::Result<Option<ContentEntity>>;

    /// Whether `id` exists with the given type and one of `statuses`.
    /// An empty `statuses` slice accepts any status.
    async fn entity_exists(
        &self,
        id: DealId,
        entity_type: &str,
        statuses: &[EntityStatus],
    ) -> anyhow::Result<bool> {
        Ok(self.get_entity(id).await?.is_some_and(|entity| {
            entity.entity_type == entity_type
                && (statuses.is_empty() || statuses.contains(&entity.status))
        }))
    }

    async fn get_entity_meta(&self, id: DealId, key: &str) -> anyhow::Result<Option<String>>;
}

/// Outbound mail transport
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_notification(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_status_parse() {
        assert_eq!("draft".parse::<EntityStatus>().unwrap(), EntityStatus::Draft);
        assert!("published".parse::<EntityStatus>().is_err());
        assert_eq!(EntityStatus::Publish.to_string(), "publish");
    }
}
