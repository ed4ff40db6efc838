use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::message::NewMessage;
use crate::forms::sanitize::sanitize_multiline_text;

const CONTENT_MAX_LEN: u64 = 2000;

pub type MessageFormResult<T> = Result<T, MessageFormError>;

#[derive(Debug, Error)]
pub enum MessageFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("message cannot be empty")]
    EmptyContent,
    #[error("cannot send a message to yourself")]
    SelfAddressed,
}

/// Body of `POST /api/messages`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageForm {
    pub receiver_id: i32,
    #[validate(length(min = 1, max = CONTENT_MAX_LEN))]
    pub content: String,
    pub order_id: Option<i32>,
}

impl SendMessageForm {
    pub fn into_new_message(self, sender_id: i32) -> MessageFormResult<NewMessage> {
        self.validate()?;

        if self.receiver_id == sender_id {
            return Err(MessageFormError::SelfAddressed);
        }

        let content = sanitize_multiline_text(&self.content);
        if content.is_empty() {
            return Err(MessageFormError::EmptyContent);
        }

        let mut message = NewMessage::direct(sender_id, self.receiver_id, content);
        if let Some(order_id) = self.order_id {
            message = message.about_order(order_id);
        }
        Ok(message)
    }
}

/// Query of `GET /api/messages`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct InboxFilter {
    #[serde(default)]
    pub unread_only: bool,
}
