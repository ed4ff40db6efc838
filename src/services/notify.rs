//! System notifications posted to the mailbox after state changes.

use crate::domain::message::NewMessage;
use crate::repository::MessageWriter;

/// Post a notification to `receiver_id`. Failures are logged and swallowed so
/// the operation that triggered the notification still succeeds.
pub fn notify<R>(repo: &R, receiver_id: i32, order_id: Option<i32>, content: impl Into<String>)
where
    R: MessageWriter + ?Sized,
{
    let mut message = NewMessage::notification(receiver_id, content);
    if let Some(order_id) = order_id {
        message = message.about_order(order_id);
    }

    if let Err(err) = repo.create_message(&message) {
        log::warn!("Failed to notify user {receiver_id}: {err}");
    }
}
