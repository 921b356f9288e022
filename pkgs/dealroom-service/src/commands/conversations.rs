use dealroom_access::UserId;
use dealroom_store::ConversationSummary;
use futures::future::join_all;
use tracing::debug;

use crate::commands::{authenticate, lookup_deal, lookup_user};
use crate::models::{ConversationView, DealRef};
use crate::{DealRoomState, Result};

/// Conversations of the caller, most recent first.
///
/// Counterparties that no longer resolve are left out. A referenced deal
/// that no longer resolves leaves `deal` empty.
pub async fn conversations_list(
    caller: UserId,
    state: &DealRoomState,
) -> Result<Vec<ConversationView>> {
    let viewer = authenticate(state, caller).await?;
    let summaries = state.conversations.list_conversations(viewer.id).await?;

    let total = summaries.len();
    let views: Vec<ConversationView> = join_all(
        summaries
            .into_iter()
            .map(|summary| enrich(state, summary)),
    )
    .await
    .into_iter()
    .flatten()
    .collect();

    if views.len() < total {
        debug!(
            "Skipped {} conversations of {} with unknown users",
            total - views.len(),
            viewer.id
        );
    }
    Ok(views)
}

async fn enrich(state: &DealRoomState, summary: ConversationSummary) -> Option<ConversationView> {
    let counterparty = lookup_user(state, summary.counterparty_id).await?;

    let deal = match summary.last_message.deal_id {
        Some(deal_id) => lookup_deal(state, deal_id).await.map(DealRef::from),
        None => None,
    };

    Some(ConversationView {
        counterparty_id: counterparty.id,
        counterparty_name: counterparty.display_name,
        last_message_at: summary.last_message_at(),
        last_message: summary.last_message.body,
        unread_count: summary.unread_count,
        deal,
    })
}
