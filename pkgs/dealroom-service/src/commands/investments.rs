use std::collections::BTreeMap;

use dealroom_access::{Capability, UserId};
use dealroom_store::{ActivityAction, DealId, InvestmentRecord, InvestmentStatus, NewActivity};
use futures::future::join_all;
use serde_json::json;
use tracing::{debug, warn};

use crate::commands::{authenticate, lookup_deal, record_activity, require, require_deal};
use crate::models::{InvestmentSummary, TrackInvestmentRequest, TrackedInvestment};
use crate::{DealRoomState, Result};

const NO_TRACK: &str = "You do not have permission to track investments";

/// Create or overwrite the caller's record for a deal. A missing status
/// means `interested`.
pub async fn investment_track(
    caller: UserId,
    request: TrackInvestmentRequest,
    state: &DealRoomState,
) -> Result<InvestmentRecord> {
    let user = authenticate(state, caller).await?;
    require(state, &user, Capability::ViewDeals, NO_TRACK)?;

    let status = match request.status.as_deref() {
        Some(status) => status.trim().parse::<InvestmentStatus>()?,
        None => InvestmentStatus::default(),
    };

    require_deal(state, request.deal_id).await?;

    let notes = request.notes.as_deref().map(str::trim).unwrap_or_default();
    let record = state
        .investments
        .track(user.id, request.deal_id, status, request.amount, notes)
        .await?;

    record_activity(
        state,
        NewActivity::new(user.id, ActivityAction::TrackInvestment, request.deal_id).with_details(
            json!({
                "status": record.status,
                "amount": record.amount,
            }),
        ),
    )
    .await;

    Ok(record)
}

/// The caller's tracked investments keyed by deal.
///
/// Records whose deal no longer resolves are left out of the result but
/// kept in storage.
pub async fn investments_list(
    caller: UserId,
    state: &DealRoomState,
) -> Result<BTreeMap<DealId, TrackedInvestment>> {
    let user = authenticate(state, caller).await?;
    require(state, &user, Capability::ViewDeals, NO_TRACK)?;

    let records = state.investments.list(user.id).await?;
    let stored = records.len();

    let tracked: BTreeMap<DealId, TrackedInvestment> =
        join_all(records.into_values().map(|record| enrich(state, record)))
            .await
            .into_iter()
            .flatten()
            .map(|t| (t.deal_id, t))
            .collect();

    debug!(
        "User {} tracks {} deals, {} resolvable",
        user.id,
        stored,
        tracked.len()
    );
    Ok(tracked)
}

/// Pipeline counts and totals over the resolvable tracked deals
pub async fn investments_summary(
    caller: UserId,
    state: &DealRoomState,
) -> Result<InvestmentSummary> {
    let tracked = investments_list(caller, state).await?;
    Ok(InvestmentSummary::from_records(tracked.values()))
}

async fn enrich(state: &DealRoomState, record: InvestmentRecord) -> Option<TrackedInvestment> {
    let deal = lookup_deal(state, record.deal_id).await?;

    let organization_name = match state
        .content
        .get_entity_meta(record.deal_id, "organization_name")
        .await
    {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            warn!("Deal {} meta lookup failed: {:#}", record.deal_id, e);
            None
        }
    };

    Some(TrackedInvestment {
        deal_id: record.deal_id,
        title: deal.title,
        organization_name,
        permalink: deal.permalink,
        status: record.status,
        amount: record.amount,
        notes: record.notes,
        updated_at: record.updated_at,
    })
}
