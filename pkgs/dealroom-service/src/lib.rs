//! # DealRoom Service
//!
//! Request-level operations for deal-room messaging and investor tools. Each
//! operation takes the calling user's id, its request, and a reference to the
//! shared [`DealRoomState`], and returns a serializable result or an
//! [`Error`] from the taxonomy in [`error`].
//!
//! ## Features
//!
//! - **Messaging**: send, fetch-and-acknowledge, mark read, unread badge
//! - **Conversations**: inbox derived from the message log
//! - **Watchlist**: add, remove, toggle, membership check, enriched listing
//! - **Investment tracking**: per-deal pipeline records and a summary
//! - **Notes and comparison**: private deal notes, side-by-side summaries
//!
//! ## Architecture
//!
//! - **commands**: one async function per operation
//!   - `messaging`: `message_send`, `messages_fetch`, `messages_mark_read`, `messages_unread_count`
//!   - `conversations`: `conversations_list`
//!   - `watchlist`: `watchlist_*`, `notes_save`, `deals_compare`
//!   - `investments`: `investment_track`, `investments_list`, `investments_summary`
//! - **providers**: traits for the identity provider, content store and mail transport
//! - **notifications**: new-message mail composition and fire-and-forget dispatch
//! - **models**: request and response DTOs (camelCase JSON)
//! - **state**: `DealRoomState`, built once and passed to every command
//!
//! ## Usage
//!
//! ```ignore
//! let db = dealroom_store::connect(&PersistenceConfig::default()).await?;
//! let state = DealRoomState::new(db, ServiceConfig::default(), identity, content, notifier);
//!
//! let sent = message_send(
//!     investor_id,
//!     SendMessageRequest {
//!         recipient_id: entrepreneur_id,
//!         body: "Interested in your deal".to_string(),
//!         deal_id: Some(42),
//!     },
//!     &state,
//! )
//! .await?;
//! ```

mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod notifications;
pub mod providers;
pub mod state;

pub use commands::conversations::conversations_list;
pub use commands::investments::{investment_track, investments_list, investments_summary};
pub use commands::messaging::{
    message_send, messages_fetch, messages_mark_read, messages_unread_count,
};
pub use commands::watchlist::{
    deals_compare, notes_save, watchlist_add, watchlist_contains, watchlist_list,
    watchlist_remove, watchlist_toggle,
};
pub use config::{ServiceConfig, WatchlistView};
pub use error::{Error, ErrorResponse, Result};
pub use models::*;
pub use notifications::{NewMessageNotice, Notification, NotificationDispatcher};
pub use providers::{
    ContentEntity, ContentStore, EntityStatus, IdentityProvider, Notifier, UserProfile,
};
pub use state::DealRoomState;
