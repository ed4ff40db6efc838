use chrono::NaiveDateTime;
use serde::Serialize;

use crate::pagination::Pagination;

/// Mailbox entry. Messages without a sender are system notifications.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Message {
    /// Unique identifier of the message.
    pub id: i32,
    /// Sending user; `None` for system notifications.
    pub sender_id: Option<i32>,
    /// Mailbox owner.
    pub receiver_id: i32,
    /// Order the message is about, if any.
    pub order_id: Option<i32>,
    /// Message body.
    pub content: String,
    /// Set once the receiver marks it read.
    pub is_read: bool,
    /// When the message was sent.
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub sender_id: Option<i32>,
    pub receiver_id: i32,
    pub order_id: Option<i32>,
    pub content: String,
}

impl NewMessage {
    pub fn direct(sender_id: i32, receiver_id: i32, content: impl Into<String>) -> Self {
        Self {
            sender_id: Some(sender_id),
            receiver_id,
            order_id: None,
            content: content.into(),
        }
    }

    pub fn notification(receiver_id: i32, content: impl Into<String>) -> Self {
        Self {
            sender_id: None,
            receiver_id,
            order_id: None,
            content: content.into(),
        }
    }

    pub fn about_order(mut self, order_id: i32) -> Self {
        self.order_id = Some(order_id);
        self
    }
}

#[derive(Debug, Clone)]
pub struct MessageListQuery {
    pub receiver_id: i32,
    pub unread_only: bool,
    pub pagination: Option<Pagination>,
}

impl MessageListQuery {
    pub fn new(receiver_id: i32) -> Self {
        Self {
            receiver_id,
            unread_only: false,
            pagination: None,
        }
    }

    pub fn unread_only(mut self) -> Self {
        self.unread_only = true;
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}
