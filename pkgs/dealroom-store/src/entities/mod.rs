//! Sea-ORM entities for dealroom-store

pub mod activity_log;
pub mod deal_notes;
pub mod investments;
pub mod messages;
pub mod watchlist;

pub use activity_log::Entity as ActivityLog;
pub use deal_notes::Entity as DealNotes;
pub use investments::Entity as Investments;
pub use messages::Entity as Message;
pub use watchlist::Entity as Watchlist;
