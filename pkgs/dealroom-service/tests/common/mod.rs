// Copyright 2024 DealRoom Team.
//
// Shared fixtures for the service integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dealroom_access::{Role, UserId};
use dealroom_service::{
    ContentEntity, ContentStore, DealRoomState, EntityStatus, IdentityProvider, Notification,
    Notifier, ServiceConfig, UserProfile,
};
use dealroom_store::{ActivityLogger, DealId, NewActivity, PersistenceConfig, StoreError};
use sea_orm::DatabaseConnection;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

pub const ALICE: UserId = 1; // investor
pub const BOB: UserId = 2; // entrepreneur
pub const CAROL: UserId = 3; // investor
pub const ADMIN: UserId = 4;
pub const ERIN: UserId = 5; // subscriber
pub const NOBODY: UserId = 404;

#[derive(Default)]
pub struct FakeIdentity {
    users: Mutex<HashMap<UserId, UserProfile>>,
}

impl FakeIdentity {
    pub fn add(&self, id: UserId, name: &str, role: Role) {
        self.users.lock().unwrap().insert(
            id,
            UserProfile {
                id,
                display_name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                role,
            },
        );
    }

    pub fn delete(&self, id: UserId) {
        self.users.lock().unwrap().remove(&id);
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn find_user(&self, id: UserId) -> anyhow::Result<Option<UserProfile>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

#[derive(Default)]
pub struct FakeContent {
    entities: Mutex<HashMap<DealId, ContentEntity>>,
    meta: Mutex<HashMap<(DealId, String), String>>,
}

impl FakeContent {
    pub fn add(&self, id: DealId, entity_type: &str, title: &str, status: EntityStatus) {
        self.entities.lock().unwrap().insert(
            id,
            ContentEntity {
                id,
                entity_type: entity_type.to_string(),
                title: title.to_string(),
                status,
                permalink: format!("https://deals.example.com/deal/{}", id),
            },
        );
    }

    pub fn set_meta(&self, id: DealId, key: &str, value: &str) {
        self.meta
            .lock()
            .unwrap()
            .insert((id, key.to_string()), value.to_string());
    }

    pub fn delete(&self, id: DealId) {
        self.entities.lock().unwrap().remove(&id);
    }
}

#[async_trait]
impl ContentStore for FakeContent {
    async fn get_entity(&self, id: DealId) -> anyhow::Result<Option<ContentEntity>> {
        Ok(self.entities.lock().unwrap().get(&id).cloned())
    }

    async fn get_entity_meta(&self, id: DealId, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .meta
            .lock()
            .unwrap()
            .get(&(id, key.to_string()))
            .cloned())
    }
}

/// Forwards every notification to a channel
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_notification(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        self.tx.send(Notification {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        })?;
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_notification(&self, _: &str, _: &str, _: &str) -> anyhow::Result<()> {
        anyhow::bail!("mail transport unavailable")
    }
}

pub struct FailingActivityLogger;

#[async_trait]
impl ActivityLogger for FailingActivityLogger {
    async fn record(&self, _: NewActivity) -> dealroom_store::Result<()> {
        Err(StoreError::Corrupt("activity log unavailable".to_string()))
    }
}

pub struct TestApp {
    pub state: DealRoomState,
    pub db: DatabaseConnection,
    pub identity: Arc<FakeIdentity>,
    pub content: Arc<FakeContent>,
    pub mail: mpsc::UnboundedReceiver<Notification>,
}

async fn in_memory_db() -> DatabaseConnection {
    dealroom_store::connect_in_memory()
        .await
        .expect("Failed to open database")
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(in_memory_db().await, None).await
    }

    pub async fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        Self::build(in_memory_db().await, Some(notifier)).await
    }

    /// Backed by a database file, so concurrent requests use separate
    /// pooled connections
    pub async fn on_disk(path: &NamedTempFile) -> Self {
        let config = PersistenceConfig {
            db_path: path.path().to_path_buf(),
            ..Default::default()
        };
        let db = dealroom_store::connect(&config)
            .await
            .expect("Failed to open database");
        Self::build(db, None).await
    }

    async fn build(db: DatabaseConnection, notifier: Option<Arc<dyn Notifier>>) -> Self {
        let identity = Arc::new(FakeIdentity::default());
        identity.add(ALICE, "Alice", Role::Investor);
        identity.add(BOB, "Bob", Role::Entrepreneur);
        identity.add(CAROL, "Carol", Role::Investor);
        identity.add(ADMIN, "Admin", Role::Admin);
        identity.add(ERIN, "Erin", Role::Other);

        let content = Arc::new(FakeContent::default());
        content.add(42, "deal", "Solar Farm", EntityStatus::Publish);
        content.add(7, "deal", "Fintech Seed", EntityStatus::Publish);
        content.add(99, "deal", "Biotech Series A", EntityStatus::Publish);
        content.add(50, "deal", "Stealth Draft", EntityStatus::Draft);
        content.add(60, "page", "About us", EntityStatus::Publish);
        content.set_meta(42, "sector", "Energy");
        content.set_meta(42, "organization_name", "Sunny Ltd");
        content.set_meta(42, "funding_ask", "250000");
        content.set_meta(7, "organization_name", "PayCo");

        let (tx, mail) = mpsc::unbounded_channel();
        let notifier: Arc<dyn Notifier> = match notifier {
            Some(notifier) => notifier,
            None => Arc::new(RecordingNotifier { tx }),
        };

        let config = ServiceConfig {
            site_url: "https://deals.example.com".to_string(),
            ..Default::default()
        };

        let state = DealRoomState::new(
            db.clone(),
            config,
            identity.clone(),
            content.clone(),
            notifier,
        );

        Self {
            state,
            db,
            identity,
            content,
            mail,
        }
    }
}
