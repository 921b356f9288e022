//! Service configuration

use serde::{Deserialize, Serialize};

use crate::providers::EntityStatus;

/// Which status policy a watchlist listing applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchlistView {
    /// The investor's own dashboard
    #[default]
    Investor,
    /// Public API listing
    Public,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceConfig {
    /// Base URL used for reply links in notification mail
    pub site_url: String,
    /// Site name shown in notification mail
    pub site_name: String,
    /// Entity type deals are stored under in the content store
    pub deal_type: String,
    /// Deal statuses visible in the investor's own watchlist
    pub investor_watchlist_statuses: Vec<EntityStatus>,
    /// Deal statuses visible in the public watchlist listing
    pub public_watchlist_statuses: Vec<EntityStatus>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost".to_string(),
            site_name: "DealRoom".to_string(),
            deal_type: "deal".to_string(),
            investor_watchlist_statuses: vec![
                EntityStatus::Publish,
                EntityStatus::Pending,
                EntityStatus::Draft,
            ],
            public_watchlist_statuses: vec![EntityStatus::Publish],
        }
    }
}

impl ServiceConfig {
    pub fn watchlist_statuses(&self, view: WatchlistView) -> &[EntityStatus] {
        match view {
            WatchlistView::Investor => &self.investor_watchlist_statuses,
            WatchlistView::Public => &self.public_watchlist_statuses,
        }
    }
}
