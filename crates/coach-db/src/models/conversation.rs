//! Conversation query result models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One row of the recent-conversations query: the newest message exchanged
/// with a partner, joined with that partner's profile columns
#[derive(Debug, Clone, FromRow)]
pub struct ConversationRowModel {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub kind: String,
    pub body: String,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub partner_id: i64,
    pub partner_display_name: String,
    pub partner_role: String,
}

/// One row of the unread-by-sender aggregate
#[derive(Debug, Clone, FromRow)]
pub struct SenderUnreadModel {
    pub sender_id: i64,
    pub count: i64,
}
