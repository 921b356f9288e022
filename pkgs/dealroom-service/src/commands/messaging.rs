use dealroom_access::{can_contact, UserId};
use dealroom_store::{ActivityAction, NewActivity, NewMessage, ThreadFilter};
use serde_json::json;
use tracing::{debug, info};

use crate::commands::{authenticate, find_user, lookup_deal, record_activity};
use crate::models::{
    CountResponse, FetchMessagesRequest, MarkReadRequest, MessageView, SendMessageRequest,
};
use crate::notifications::NewMessageNotice;
use crate::{DealRoomState, Error, Result};

/// Send a message.
///
/// The message is persisted before anything else happens. The activity
/// entry and the notification mail follow on a best-effort basis and never
/// fail the send. Retrying a send stores the message again.
pub async fn message_send(
    caller: UserId,
    request: SendMessageRequest,
    state: &DealRoomState,
) -> Result<MessageView> {
    let sender = authenticate(state, caller).await?;

    let body = request.body.trim();
    if body.is_empty() {
        return Err(Error::Validation("Message cannot be empty".to_string()));
    }
    if request.recipient_id == sender.id {
        return Err(Error::Validation("You cannot message yourself".to_string()));
    }

    let recipient = find_user(state, request.recipient_id)
        .await?
        .ok_or_else(|| Error::Validation("Recipient not found".to_string()))?;

    if !can_contact(sender.role, recipient.role) {
        return Err(Error::Permission("You cannot message this user".to_string()));
    }

    let message = state
        .messages
        .insert(NewMessage {
            sender_id: sender.id,
            recipient_id: recipient.id,
            deal_id: request.deal_id,
            body: body.to_string(),
        })
        .await?;

    record_activity(
        state,
        NewActivity::new(sender.id, ActivityAction::SendMessage, message.id).with_details(json!({
            "recipient_id": recipient.id,
            "deal_id": message.deal_id,
        })),
    )
    .await;

    let deal = match message.deal_id {
        Some(deal_id) => lookup_deal(state, deal_id).await,
        None => None,
    };
    let notification = state.notifications.compose(&NewMessageNotice {
        sender_id: sender.id,
        sender_name: &sender.display_name,
        recipient_email: &recipient.email,
        deal_id: message.deal_id,
        deal_title: deal.as_ref().map(|d| d.title.as_str()),
        text: &message.body,
    });
    state.notifications.dispatch(notification);

    info!("Message {} sent from {} to {}", message.id, sender.id, recipient.id);
    Ok(MessageView::new(message, sender.id, &sender.display_name))
}

/// Fetch the thread with one counterparty and acknowledge it.
///
/// Returned messages carry the read flag they had before this call. Every
/// returned message addressed to the caller is marked read.
pub async fn messages_fetch(
    caller: UserId,
    request: FetchMessagesRequest,
    state: &DealRoomState,
) -> Result<Vec<MessageView>> {
    let viewer = authenticate(state, caller).await?;

    let counterparty = find_user(state, request.counterparty_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    let messages = state
        .messages
        .fetch_and_acknowledge(
            viewer.id,
            counterparty.id,
            ThreadFilter {
                deal_id: request.deal_id,
                since_id: request.since_id,
            },
        )
        .await?;

    let views = messages
        .into_iter()
        .map(|message| {
            let sender_name = if message.sender_id == viewer.id {
                &viewer.display_name
            } else {
                &counterparty.display_name
            };
            MessageView::new(message, viewer.id, sender_name)
        })
        .collect::<Vec<_>>();

    debug!(
        "Fetched {} messages between {} and {}",
        views.len(),
        viewer.id,
        counterparty.id
    );
    Ok(views)
}

/// Mark messages read. Ids the caller did not receive, or that are already
/// read, are skipped and not counted.
pub async fn messages_mark_read(
    caller: UserId,
    request: MarkReadRequest,
    state: &DealRoomState,
) -> Result<CountResponse> {
    let viewer = authenticate(state, caller).await?;

    if request.message_ids.is_empty() {
        return Err(Error::Validation("No messages selected".to_string()));
    }

    let count = state
        .messages
        .mark_read(&request.message_ids, viewer.id)
        .await?;

    Ok(CountResponse { count })
}

/// Unread messages addressed to the caller
pub async fn messages_unread_count(caller: UserId, state: &DealRoomState) -> Result<CountResponse> {
    let viewer = authenticate(state, caller).await?;
    let count = state.messages.count_unread(viewer.id).await?;

    Ok(CountResponse { count })
}
