//! DealRoom Store - persistent storage for deal-room messaging and investor tools
//!
//! This crate provides SQLite-based persistent storage using Sea-ORM.
//!
//! # Architecture
//!
//! The storage layer is organized into several specialized managers, each
//! constructed from a shared `DatabaseConnection`:
//!
//! - **MessageStore**: Append-only message log with read/unread state
//! - **ConversationStore**: Per-counterparty conversation view derived from the message log
//! - **WatchlistStore**: Unique (user, deal) watchlist membership
//! - **InvestmentTracker**: Per-user, per-deal investment pipeline records
//! - **DealNotesStore**: Private per-user notes on deals
//! - **ActivityLog**: Append-only audit trail of user actions
//!
//! # Database Schema
//!
//! - `messages`: sender, recipient, optional deal, body, read flag, timestamps
//! - `watchlist`: (user_id, deal_id) unique membership rows
//! - `investments`: (user_id, deal_id) unique tracker records
//! - `deal_notes`: (user_id, deal_id) unique notes
//! - `activity_log`: user actions with optional JSON details
//!
//! Timestamps are stored as milliseconds since the Unix epoch.
//!
//! # Concurrency
//!
//! No manager holds a lock. The guarantees callers rely on come from single
//! statements: the unique indexes plus `ON CONFLICT` make watchlist inserts
//! and tracker upserts atomic, message ids come from SQLite's rowid, and
//! acknowledging messages is one conditional `UPDATE`.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use dealroom_store::{MessageStore, NewMessage, PersistenceConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PersistenceConfig {
//!     db_path: "dealroom.db".into(),
//!     ..Default::default()
//! };
//!
//! let db = dealroom_store::connect(&config).await?;
//! let messages = MessageStore::new(db);
//!
//! let sent = messages
//!     .insert(NewMessage {
//!         sender_id: 1,
//!         recipient_id: 2,
//!         deal_id: Some(42),
//!         body: "Interested in your deal".to_string(),
//!     })
//!     .await?;
//! assert!(!sent.is_read);
//! # Ok(())
//! # }
//! ```

pub mod activity_log;
pub mod conversation_store;
pub mod deal_notes;
pub mod entities;
pub mod error;
pub mod investment_tracker;
pub mod message_store;
pub mod migration;
pub mod watchlist_store;

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

pub use dealroom_access::UserId;

pub use activity_log::{ActivityAction, ActivityEntry, ActivityLog, ActivityLogger, NewActivity};
pub use conversation_store::{ConversationStore, ConversationSummary};
pub use deal_notes::DealNotesStore;
pub use error::{Result, StoreError};
pub use investment_tracker::{InvestmentRecord, InvestmentStatus, InvestmentTracker};
pub use message_store::{Message, MessageId, MessageStore, NewMessage, ThreadFilter};
pub use watchlist_store::{WatchlistEntry, WatchlistStore};

/// Identifier of a deal entity in the content store.
pub type DealId = i64;

/// Configuration for persistence layer
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,

    /// Maximum number of pooled connections (default: 5)
    pub max_connections: u32,

    /// Interval in seconds clients are told to poll for new messages (default: 30s).
    /// New messages may be observed up to one interval late.
    pub poll_interval_seconds: u64,

    /// Default number of entries returned by activity log reads (default: 50)
    pub activity_page_size: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("dealroom.db"),
            max_connections: 5,
            poll_interval_seconds: 30,
            activity_page_size: 50,
        }
    }
}

impl PersistenceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

/// Open (creating if needed) the database described by `config` and run migrations.
pub async fn connect(config: &PersistenceConfig) -> Result<DatabaseConnection> {
    let db_path_str = config
        .db_path
        .to_str()
        .ok_or_else(|| StoreError::Config("Invalid database path".to_string()))?
        .replace("\\", "/");

    let mut options = ConnectOptions::new(format!("sqlite:{}?mode=rwc", db_path_str));
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;

    info!("DealRoom store initialized at {}", config.db_path.display());
    Ok(db)
}

/// Open a private in-memory database with all migrations applied.
pub async fn connect_in_memory() -> Result<DatabaseConnection> {
    // Every pooled connection would get its own empty database
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {}", millis)))
}
