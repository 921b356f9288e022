//! JSON-backed user and deal directory
//!
//! Stands in for the identity provider and the content store. The file looks
//! like:
//!
//! ```json
//! {
//!   "users": [
//!     { "id": 1, "displayName": "Alice", "email": "alice@example.com", "role": "investor" }
//!   ],
//!   "deals": [
//!     { "id": 42, "title": "Solar Farm", "status": "publish",
//!       "permalink": "https://example.com/deal/42", "meta": { "sector": "Energy" } }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use dealroom_access::UserId;
use dealroom_service::{ContentEntity, ContentStore, EntityStatus, IdentityProvider, UserProfile};
use dealroom_store::DealId;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DirectoryFile {
    users: Vec<UserProfile>,
    deals: Vec<DealRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DealRecord {
    id: DealId,
    #[serde(default = "default_entity_type")]
    entity_type: String,
    title: String,
    status: EntityStatus,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    meta: HashMap<String, String>,
}

fn default_entity_type() -> String {
    "deal".to_string()
}

#[derive(Debug, Default)]
pub struct Directory {
    users: HashMap<UserId, UserProfile>,
    entities: HashMap<DealId, ContentEntity>,
    meta: HashMap<DealId, HashMap<String, String>>,
}

impl Directory {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read directory {}", path.display()))?;
        let directory = Self::from_json(&raw)
            .with_context(|| format!("Failed to parse directory {}", path.display()))?;

        info!(
            "Loaded {} users and {} deals from {}",
            directory.users.len(),
            directory.entities.len(),
            path.display()
        );
        Ok(directory)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let file: DirectoryFile = serde_json::from_str(raw)?;
        let mut directory = Directory::default();

        for user in file.users {
            directory.users.insert(user.id, user);
        }
        for deal in file.deals {
            directory.meta.insert(deal.id, deal.meta);
            directory.entities.insert(
                deal.id,
                ContentEntity {
                    id: deal.id,
                    entity_type: deal.entity_type,
                    title: deal.title,
                    status: deal.status,
                    permalink: deal.permalink,
                },
            );
        }

        Ok(directory)
    }
}

#[async_trait]
impl IdentityProvider for Directory {
    async fn find_user(&self, id: UserId) -> anyhow::Result<Option<UserProfile>> {
        Ok(self.users.get(&id).cloned())
    }
}

#[async_trait]
impl ContentStore for Directory {
    async fn get_entity(&self, id: DealId) -> anyhow::Result<Option<ContentEntity>> {
        Ok(self.entities.get(&id).cloned())
    }

    async fn get_entity_meta(&self, id: DealId, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.meta.get(&id).and_then(|meta| meta.get(key)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealroom_access::Role;

    const SAMPLE: &str = r#"{
        "users": [
            { "id": 1, "displayName": "Alice", "email": "alice@example.com", "role": "investor" },
            { "id": 2, "displayName": "Bob", "email": "bob@example.com", "role": "entrepreneur" }
        ],
        "deals": [
            { "id": 42, "title": "Solar Farm", "status": "publish", "meta": { "sector": "Energy" } },
            { "id": 60, "entityType": "page", "title": "About", "status": "publish" }
        ]
    }"#;

    #[tokio::test]
    async fn test_lookups() {
        let directory = Directory::from_json(SAMPLE).unwrap();

        let bob = directory.find_user(2).await.unwrap().unwrap();
        assert_eq!(bob.role, Role::Entrepreneur);
        assert!(directory.find_user(3).await.unwrap().is_none());

        assert!(directory.entity_exists(42, "deal", &[]).await.unwrap());
        assert!(!directory.entity_exists(60, "deal", &[]).await.unwrap());
        assert!(!directory
            .entity_exists(42, "deal", &[EntityStatus::Draft])
            .await
            .unwrap());

        let sector = directory.get_entity_meta(42, "sector").await.unwrap();
        assert_eq!(sector.as_deref(), Some("Energy"));
    }

    #[test]
    fn test_load_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), SAMPLE).unwrap();

        let directory = Directory::load(file.path()).unwrap();
        assert_eq!(directory.users.len(), 2);
        assert_eq!(directory.entities.len(), 2);

        assert!(Directory::from_json("{ not json").is_err());
    }
}
