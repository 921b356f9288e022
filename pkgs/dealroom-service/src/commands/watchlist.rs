use dealroom_access::{Capability, UserId};
use dealroom_store::{ActivityAction, DealId, NewActivity, WatchlistEntry};
use futures::future::join_all;
use tracing::debug;

use crate::commands::{authenticate, deal_summary, record_activity, require, require_deal};
use crate::config::WatchlistView;
use crate::models::{DealRequest, DealSummary, SaveNotesRequest, ToggleResponse, WatchlistItem};
use crate::{DealRoomState, Error, Result};

const NO_WATCHLIST: &str = "You do not have permission to use the watchlist";
const NO_VIEW: &str = "You do not have permission to view deals";

/// Watchlist of the caller, most recently added first, with each deal's
/// summary and the caller's notes.
///
/// Deals that no longer resolve, or whose status is outside the policy of
/// `view`, are left out without touching the stored entries.
pub async fn watchlist_list(
    caller: UserId,
    view: WatchlistView,
    state: &DealRoomState,
) -> Result<Vec<WatchlistItem>> {
    let user = authenticate(state, caller).await?;
    require(state, &user, Capability::AddToWatchlist, NO_WATCHLIST)?;

    let entries = state.watchlist.list(user.id).await?;
    let mut notes = state.notes.for_user(user.id).await?;
    let statuses = state.config.watchlist_statuses(view);

    let summaries = join_all(
        entries
            .iter()
            .map(|entry| deal_summary(state, entry.deal_id, statuses)),
    )
    .await;

    let items: Vec<WatchlistItem> = entries
        .into_iter()
        .zip(summaries)
        .filter_map(|(entry, summary)| {
            summary.map(|deal| WatchlistItem {
                notes: notes.remove(&entry.deal_id),
                deal,
                added_at: entry.created_at,
            })
        })
        .collect();

    debug!("Watchlist of {} ({:?}): {} items", user.id, view, items.len());
    Ok(items)
}

/// Flip membership of a deal. Adding checks that the deal exists; removing
/// does not, so entries for deleted deals can still be cleared.
pub async fn watchlist_toggle(
    caller: UserId,
    request: DealRequest,
    state: &DealRoomState,
) -> Result<ToggleResponse> {
    let user = authenticate(state, caller).await?;
    require(state, &user, Capability::AddToWatchlist, NO_WATCHLIST)?;

    if !state.watchlist.contains(user.id, request.deal_id).await? {
        require_deal(state, request.deal_id).await?;
    }

    let in_watchlist = state.watchlist.toggle(user.id, request.deal_id).await?;

    let action = if in_watchlist {
        ActivityAction::AddToWatchlist
    } else {
        ActivityAction::RemoveFromWatchlist
    };
    record_activity(state, NewActivity::new(user.id, action, request.deal_id)).await;

    Ok(ToggleResponse { in_watchlist })
}

/// Add a deal. Fails with `Duplicate` when it is already there.
pub async fn watchlist_add(
    caller: UserId,
    request: DealRequest,
    state: &DealRoomState,
) -> Result<WatchlistEntry> {
    let user = authenticate(state, caller).await?;
    require(state, &user, Capability::AddToWatchlist, NO_WATCHLIST)?;
    require_deal(state, request.deal_id).await?;

    let entry = state.watchlist.add(user.id, request.deal_id).await?;

    record_activity(
        state,
        NewActivity::new(user.id, ActivityAction::AddToWatchlist, request.deal_id),
    )
    .await;

    Ok(entry)
}

/// Remove a deal. Removing a deal that is not there succeeds and records
/// nothing.
pub async fn watchlist_remove(
    caller: UserId,
    request: DealRequest,
    state: &DealRoomState,
) -> Result<ToggleResponse> {
    let user = authenticate(state, caller).await?;
    require(state, &user, Capability::AddToWatchlist, NO_WATCHLIST)?;

    if state.watchlist.remove(user.id, request.deal_id).await? {
        record_activity(
            state,
            NewActivity::new(user.id, ActivityAction::RemoveFromWatchlist, request.deal_id),
        )
        .await;
    }

    Ok(ToggleResponse {
        in_watchlist: false,
    })
}

pub async fn watchlist_contains(
    caller: UserId,
    request: DealRequest,
    state: &DealRoomState,
) -> Result<ToggleResponse> {
    let user = authenticate(state, caller).await?;
    let in_watchlist = state.watchlist.contains(user.id, request.deal_id).await?;

    Ok(ToggleResponse { in_watchlist })
}

/// Replace the caller's private notes on a deal
pub async fn notes_save(
    caller: UserId,
    request: SaveNotesRequest,
    state: &DealRoomState,
) -> Result<()> {
    let user = authenticate(state, caller).await?;
    require(state, &user, Capability::ViewDeals, NO_VIEW)?;
    require_deal(state, request.deal_id).await?;

    state
        .notes
        .save(user.id, request.deal_id, request.notes.trim())
        .await?;

    record_activity(
        state,
        NewActivity::new(user.id, ActivityAction::SaveNotes, request.deal_id),
    )
    .await;

    Ok(())
}

/// Summaries of the requested deals in request order. Ids that are not
/// deals are skipped.
pub async fn deals_compare(
    caller: UserId,
    deal_ids: &[DealId],
    state: &DealRoomState,
) -> Result<Vec<DealSummary>> {
    let user = authenticate(state, caller).await?;
    require(state, &user, Capability::ViewDeals, NO_VIEW)?;

    if deal_ids.is_empty() {
        return Err(Error::Validation("No deals selected".to_string()));
    }

    let summaries = join_all(deal_ids.iter().map(|id| deal_summary(state, *id, &[])))
        .await
        .into_iter()
        .flatten()
        .collect();

    Ok(summaries)
}
