use serde::{Deserialize, Serialize};
use time::UtcOffset;
use validator::Validate;

use crate::core::time::{format_local_clock, format_primitive};
use crate::db::models::{Message, MessageWithSender};

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub(crate) id: String,
    pub(crate) session_id: String,
    pub(crate) sender_id: String,
    pub(crate) sender_name: Option<String>,
    pub(crate) content: String,
    pub(crate) sent_at: String,
    /// Local `HH:MM`.
    pub(crate) time: String,
}

impl MessageResponse {
    pub(crate) fn from_db(message: Message, offset: UtcOffset) -> Self {
        Self {
            time: format_local_clock(message.sent_at, offset),
            sent_at: format_primitive(message.sent_at),
            id: message.id,
            session_id: message.session_id,
            sender_id: message.sender_id,
            sender_name: None,
            content: message.body,
        }
    }

    pub(crate) fn with_sender(row: MessageWithSender, offset: UtcOffset) -> Self {
        let mut response = Self::from_db(row.message, offset);
        response.sender_name = Some(row.sender_name);
        response
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ChatMessageRequest {
    #[serde(alias = "mensaje")]
    #[validate(length(max = 5000, message = "content is too long"))]
    pub(crate) content: String,
}

/// Shape consumed by the chat widget after posting.
#[derive(Debug, Serialize)]
pub(crate) struct ChatPostResponse {
    pub(crate) id: String,
    pub(crate) sender: String,
    pub(crate) content: String,
    pub(crate) time: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatResponse {
    pub(crate) session_id: String,
    pub(crate) messages: Vec<MessageResponse>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MessageCreate {
    pub(crate) session_id: String,
    #[serde(alias = "mensaje")]
    #[validate(length(max = 5000, message = "content is too long"))]
    pub(crate) content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MessageUpdate {
    #[serde(alias = "mensaje")]
    #[validate(length(max = 5000, message = "content is too long"))]
    pub(crate) content: String,
}
