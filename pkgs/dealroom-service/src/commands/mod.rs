// Messaging commands
pub mod messaging;

// Conversation commands
pub mod conversations;

// Watchlist, notes and comparison commands
pub mod watchlist;

// Investment tracker commands
pub mod investments;

use dealroom_access::{Capability, UserId};
use dealroom_store::{DealId, NewActivity};
use futures::future::join_all;
use tracing::warn;

use crate::models::{DealSummary, SUMMARY_META_KEYS};
use crate::providers::{ContentEntity, EntityStatus, UserProfile};
use crate::{DealRoomState, Error, Result};

/// Resolve the calling user
pub(crate) async fn authenticate(state: &DealRoomState, caller: UserId) -> Result<UserProfile> {
    state
        .identity
        .find_user(caller)
        .await
        .map_err(|e| Error::upstream("Failed to resolve caller", e))?
        .ok_or_else(|| Error::Permission("You must be logged in".to_string()))
}

pub(crate) fn require(
    state: &DealRoomState,
    user: &UserProfile,
    capability: Capability,
    message: &str,
) -> Result<()> {
    if state.identity.has_capability(user, capability) {
        Ok(())
    } else {
        Err(Error::Permission(message.to_string()))
    }
}

/// Resolve any user; `None` when the account no longer exists
pub(crate) async fn find_user(state: &DealRoomState, id: UserId) -> Result<Option<UserProfile>> {
    state
        .identity
        .find_user(id)
        .await
        .map_err(|e| Error::upstream("Failed to resolve user", e))
}

/// Best-effort lookup used by enriched listings. A failing lookup is
/// treated like a missing user.
pub(crate) async fn lookup_user(state: &DealRoomState, id: UserId) -> Option<UserProfile> {
    match state.identity.find_user(id).await {
        Ok(user) => user,
        Err(e) => {
            warn!("User {} lookup failed: {:#}", id, e);
            None
        }
    }
}

/// Fail with `NotFound` unless `id` is a deal
pub(crate) async fn require_deal(state: &DealRoomState, id: DealId) -> Result<()> {
    let exists = state
        .content
        .entity_exists(id, &state.config.deal_type, &[])
        .await
        .map_err(|e| Error::upstream("Failed to load deal", e))?;

    if exists {
        Ok(())
    } else {
        Err(Error::NotFound("Deal not found".to_string()))
    }
}

/// Best-effort deal lookup for enriched listings
pub(crate) async fn lookup_deal(state: &DealRoomState, id: DealId) -> Option<ContentEntity> {
    match state.content.get_entity(id).await {
        Ok(entity) => entity.filter(|e| e.entity_type == state.config.deal_type),
        Err(e) => {
            warn!("Deal {} lookup failed: {:#}", id, e);
            None
        }
    }
}

/// Deal summary with its metadata. `None` when the deal does not resolve
/// or its status is not in `statuses` (empty accepts any).
pub(crate) async fn deal_summary(
    state: &DealRoomState,
    id: DealId,
    statuses: &[EntityStatus],
) -> Option<DealSummary> {
    let entity = lookup_deal(state, id).await?;
    if !statuses.is_empty() && !statuses.contains(&entity.status) {
        return None;
    }

    let meta = join_all(
        SUMMARY_META_KEYS
            .iter()
            .map(|key| state.content.get_entity_meta(id, *key)),
    )
    .await;

    let mut values = meta.into_iter().map(|value| match value {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            warn!("Deal {} meta lookup failed: {:#}", id, e);
            None
        }
    });

    Some(DealSummary {
        id: entity.id,
        title: entity.title,
        permalink: entity.permalink,
        status: entity.status,
        sector: values.next().flatten(),
        organization_name: values.next().flatten(),
        funding_ask: values.next().flatten(),
        funding_stage: values.next().flatten(),
        equity_offered: values.next().flatten(),
        minimum_investment: values.next().flatten(),
        location: values.next().flatten(),
    })
}

/// Record an activity entry. Failures are logged and never propagated.
pub(crate) async fn record_activity(state: &DealRoomState, entry: NewActivity) {
    let action = entry.action;
    let user_id = entry.user_id;

    if let Err(e) = state.activity.record(entry).await {
        warn!("Failed to record {} activity for {}: {}", action, user_id, e);
    }
}
