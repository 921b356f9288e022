//! Account roles and the messaging contact rule

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{Capability, CapabilitySet};

/// Role of an account on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Investor,
    Entrepreneur,
    /// Any account without a marketplace role (subscribers, guests)
    Other,
}

/// Error returned when a role name is not recognised
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Investor => "investor",
            Role::Entrepreneur => "entrepreneur",
            Role::Other => "other",
        }
    }

    /// Map a role slug as stored by the account system to a role.
    ///
    /// Accounts may carry several slugs; the first marketplace role found
    /// wins in the order admin, investor, entrepreneur.
    pub fn from_slugs<'a, I>(slugs: I) -> Role
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut role = Role::Other;
        for slug in slugs {
            let candidate = match slug {
                "administrator" | "admin" => Role::Admin,
                "dealroom_investor" | "investor" => Role::Investor,
                "dealroom_entrepreneur" | "entrepreneur" => Role::Entrepreneur,
                _ => continue,
            };
            if candidate.rank() < role.rank() {
                role = candidate;
            }
        }
        role
    }

    fn rank(&self) -> u8 {
        match self {
            Role::Admin => 0,
            Role::Investor => 1,
            Role::Entrepreneur => 2,
            Role::Other => 3,
        }
    }

    /// Capabilities granted to this role
    pub fn capabilities(&self) -> CapabilitySet {
        match self {
            Role::Admin => CapabilitySet::all(),
            Role::Investor => CapabilitySet::from_slice(&[
                Capability::ViewDeals,
                Capability::ContactEntrepreneurs,
                Capability::AddToWatchlist,
            ]),
            Role::Entrepreneur => {
                CapabilitySet::from_slice(&[Capability::SubmitDeal, Capability::EditOwnDeals])
            }
            Role::Other => CapabilitySet::EMPTY,
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrator" => Ok(Role::Admin),
            "investor" | "dealroom_investor" => Ok(Role::Investor),
            "entrepreneur" | "dealroom_entrepreneur" => Ok(Role::Entrepreneur),
            "other" | "subscriber" => Ok(Role::Other),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// Whether an account with role `sender` may start or continue a
/// conversation with an account with role `recipient`.
///
/// Admins may message anyone. Otherwise only investor -> entrepreneur and
/// entrepreneur -> investor are allowed.
pub fn can_contact(sender: Role, recipient: Role) -> bool {
    matches!(
        (sender, recipient),
        (Role::Admin, _)
            | (Role::Investor, Role::Entrepreneur)
            | (Role::Entrepreneur, Role::Investor)
    )
}
