//! Capabilities and capability sets

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single permission checked before an operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewDeals,
    ContactEntrepreneurs,
    AddToWatchlist,
    SubmitDeal,
    EditOwnDeals,
    ManageSettings,
    ViewReports,
    ApproveDeals,
    VerifyUsers,
}

impl Capability {
    pub const ALL: [Capability; 9] = [
        Capability::ViewDeals,
        Capability::ContactEntrepreneurs,
        Capability::AddToWatchlist,
        Capability::SubmitDeal,
        Capability::EditOwnDeals,
        Capability::ManageSettings,
        Capability::ViewReports,
        Capability::ApproveDeals,
        Capability::VerifyUsers,
    ];

    /// Name used by the account system
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewDeals => "dealroom_view_deals",
            Capability::ContactEntrepreneurs => "dealroom_contact_entrepreneurs",
            Capability::AddToWatchlist => "dealroom_add_to_watchlist",
            Capability::SubmitDeal => "dealroom_submit_deal",
            Capability::EditOwnDeals => "dealroom_edit_own_deals",
            Capability::ManageSettings => "dealroom_manage_settings",
            Capability::ViewReports => "dealroom_view_reports",
            Capability::ApproveDeals => "dealroom_approve_deals",
            Capability::VerifyUsers => "dealroom_verify_users",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of capabilities, stored as a bit mask
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Capability>", into = "Vec<Capability>")]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    pub const EMPTY: CapabilitySet = CapabilitySet(0);

    pub fn all() -> Self {
        Self::from_slice(&Capability::ALL)
    }

    pub const fn from_slice(capabilities: &[Capability]) -> Self {
        let mut mask = 0;
        let mut i = 0;
        while i < capabilities.len() {
            mask |= capabilities[i].bit();
            i += 1;
        }
        CapabilitySet(mask)
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub fn remove(&mut self, capability: Capability) {
        self.0 &= !capability.bit();
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.insert(capability);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        let mut set = CapabilitySet::EMPTY;
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

impl From<Vec<Capability>> for CapabilitySet {
    fn from(capabilities: Vec<Capability>) -> Self {
        capabilities.into_iter().collect()
    }
}

impl From<CapabilitySet> for Vec<Capability> {
    fn from(set: CapabilitySet) -> Self {
        set.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove() {
        let mut set = CapabilitySet::EMPTY;
        assert!(set.is_empty());

        set.insert(Capability::ViewDeals);
        set.insert(Capability::AddToWatchlist);
        assert!(set.contains(Capability::ViewDeals));
        assert!(set.contains(Capability::AddToWatchlist));
        assert!(!set.contains(Capability::VerifyUsers));
        assert_eq!(set.len(), 2);

        set.remove(Capability::ViewDeals);
        assert!(!set.contains(Capability::ViewDeals));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_all_contains_every_capability() {
        let all = CapabilitySet::all();
        assert_eq!(all.len(), Capability::ALL.len());
        for capability in Capability::ALL {
            assert!(all.contains(capability));
        }
    }

    #[test]
    fn test_serializes_as_list() {
        let set = CapabilitySet::EMPTY
            .with(Capability::AddToWatchlist)
            .with(Capability::ViewDeals);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["view_deals","add_to_watchlist"]"#);

        let back: CapabilitySet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
