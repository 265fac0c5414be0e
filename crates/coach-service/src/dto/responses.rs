//! Response DTOs for API endpoints and gateway events

use chrono::{DateTime, Utc};
use coach_core::{ConversationSummary, Message, MessageKind, SenderUnread, Snowflake, UserRole};
use serde::Serialize;

/// A single message as sent to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            kind: message.kind,
            message: message.body,
            attachments: message.attachments,
            created_at: message.created_at,
            is_read: message.is_read,
            read_at: message.read_at,
        }
    }
}

/// The other participant of a conversation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerResponse {
    pub id: Snowflake,
    pub display_name: String,
    pub role: UserRole,
}

/// One entry of the recent-conversations list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub partner: PartnerResponse,
    pub last_message: MessageResponse,
    pub unread_count: i64,
    pub is_last_message_from_self: bool,
}

impl ConversationResponse {
    /// Build from a summary, from `user_id`'s point of view
    #[must_use]
    pub fn from_summary(summary: ConversationSummary, user_id: Snowflake) -> Self {
        let is_last_message_from_self = summary.last_message.sender_id == user_id;
        Self {
            partner: PartnerResponse {
                id: summary.partner.id,
                display_name: summary.partner.display_name,
                role: summary.partner.role,
            },
            last_message: MessageResponse::from(summary.last_message),
            unread_count: summary.unread_count,
            is_last_message_from_self,
        }
    }
}

/// Unread count attributed to one sender
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderUnreadResponse {
    pub sender_id: Snowflake,
    pub count: i64,
}

impl From<SenderUnread> for SenderUnreadResponse {
    fn from(u: SenderUnread) -> Self {
        Self {
            sender_id: u.sender_id,
            count: u.count,
        }
    }
}

/// Unread badge payload: total plus per-sender breakdown
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountsResponse {
    pub total: i64,
    pub by_sender: Vec<SenderUnreadResponse>,
}
