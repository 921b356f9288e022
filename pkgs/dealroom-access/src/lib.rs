//! Access rules for DealRoom
//!
//! This crate holds the pieces of access control that the messaging and
//! investor-tool operations consume:
//! - Role: the closed set of account roles
//! - Capability / CapabilitySet: what a role is allowed to do
//! - can_contact: the "who may message whom" rule
//!
//! Nothing here performs I/O. Resolving which role a user has is the job of
//! the identity provider; this crate only answers questions about roles.

pub mod capabilities;
pub mod roles;

pub use capabilities::{Capability, CapabilitySet};
pub use roles::{can_contact, ParseRoleError, Role};

/// Opaque user identifier handed out by the identity provider.
pub type UserId = i64;
