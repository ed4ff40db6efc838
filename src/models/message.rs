use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::message::{Message as DomainMessage, NewMessage as DomainNewMessage};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::messages)]
pub struct Message {
    pub id: i32,
    pub sender_id: Option<i32>,
    pub receiver_id: i32,
    pub order_id: Option<i32>,
    pub content: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::messages)]
pub struct NewMessage<'a> {
    pub sender_id: Option<i32>,
    pub receiver_id: i32,
    pub order_id: Option<i32>,
    pub content: &'a str,
}

impl From<Message> for DomainMessage {
    fn from(value: Message) -> Self {
        Self {
            id: value.id,
            sender_id: value.sender_id,
            receiver_id: value.receiver_id,
            order_id: value.order_id,
            content: value.content,
            is_read: value.is_read,
            created_at: value.created_at,
        }
    }
}

impl<'a> From<&'a DomainNewMessage> for NewMessage<'a> {
    fn from(value: &'a DomainNewMessage) -> Self {
        Self {
            sender_id: value.sender_id,
            receiver_id: value.receiver_id,
            order_id: value.order_id,
            content: value.content.as_str(),
        }
    }
}
