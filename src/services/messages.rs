//! Direct messages and the notification mailbox.

use serde::Serialize;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::message::{Message, MessageListQuery};
use crate::forms::messages::{InboxFilter, SendMessageForm};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{
    AgentReader, MessageReader, MessageWriter, OrderReader, PickupSiteReader, UserReader,
};
use crate::services::orders::load_visible_order;
use crate::services::{ServiceError, ServiceResult};

/// Response body of `GET /api/messages/unread`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct UnreadCount {
    pub unread: usize,
}

/// Send a direct message. Messages about an order require the sender to be
/// party to it.
pub fn send_message<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SendMessageForm,
) -> ServiceResult<Message>
where
    R: UserReader
        + OrderReader
        + AgentReader
        + PickupSiteReader
        + MessageWriter
        + ?Sized,
{
    let new_message = form
        .into_new_message(user.id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let receiver = repo.get_user_by_id(new_message.receiver_id)?;
    if !receiver.is_some_and(|receiver| receiver.is_active) {
        return Err(ServiceError::Form("unknown recipient".to_string()));
    }

    if let Some(order_id) = new_message.order_id {
        load_visible_order(repo, user, order_id)?;
    }

    let message = repo.create_message(&new_message)?;
    log::info!(
        "User {} sent message {} to user {}",
        user.id,
        message.id,
        message.receiver_id
    );
    Ok(message)
}

pub fn inbox<R>(
    repo: &R,
    user: &AuthenticatedUser,
    filter: InboxFilter,
    pagination: Pagination,
) -> ServiceResult<Paginated<Message>>
where
    R: MessageReader + ?Sized,
{
    let mut query = MessageListQuery::new(user.id).paginate(pagination);
    if filter.unread_only {
        query = query.unread_only();
    }

    let (total, messages) = repo.list_messages(query)?;
    Ok(Paginated::new(messages, pagination, total))
}

/// Mark one of the caller's messages as read.
pub fn mark_read<R>(repo: &R, user: &AuthenticatedUser, message_id: i32) -> ServiceResult<Message>
where
    R: MessageWriter + ?Sized,
{
    Ok(repo.mark_message_read(message_id, user.id)?)
}

pub fn unread_count<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<UnreadCount>
where
    R: MessageReader + ?Sized,
{
    Ok(UnreadCount {
        unread: repo.count_unread(user.id)?,
    })
}
