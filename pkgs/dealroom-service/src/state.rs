//! Shared state handed to every operation
//!
//! Built once at process start and passed by reference; nothing is reached
//! through a global.

use std::sync::Arc;

use dealroom_store::{
    ActivityLog, ActivityLogger, ConversationStore, DealNotesStore, InvestmentTracker,
    MessageStore, WatchlistStore,
};
use sea_orm::DatabaseConnection;

use crate::config::ServiceConfig;
use crate::notifications::NotificationDispatcher;
use crate::providers::{ContentStore, IdentityProvider, Notifier};

pub struct DealRoomState {
    pub config: ServiceConfig,
    pub messages: MessageStore,
    pub conversations: ConversationStore,
    pub watchlist: WatchlistStore,
    pub investments: InvestmentTracker,
    pub notes: DealNotesStore,
    pub activity: Arc<dyn ActivityLogger>,
    pub identity: Arc<dyn IdentityProvider>,
    pub content: Arc<dyn ContentStore>,
    pub notifications: NotificationDispatcher,
}

impl DealRoomState {
    /// Wire the stores onto `db` and attach the collaborators.
    pub fn new(
        db: DatabaseConnection,
        config: ServiceConfig,
        identity: Arc<dyn IdentityProvider>,
        content: Arc<dyn ContentStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let notifications =
            NotificationDispatcher::new(notifier, &config.site_url, &config.site_name);

        Self {
            messages: MessageStore::new(db.clone()),
            conversations: ConversationStore::new(db.clone()),
            watchlist: WatchlistStore::new(db.clone()),
            investments: InvestmentTracker::new(db.clone()),
            notes: DealNotesStore::new(db.clone()),
            activity: Arc::new(ActivityLog::new(db)),
            identity,
            content,
            notifications,
            config,
        }
    }

    /// Replace the activity sink
    pub fn with_activity_logger(mut self, activity: Arc<dyn ActivityLogger>) -> Self {
        self.activity = activity;
        self
    }
}
