//! Derived conversation views
//!
//! Conversations are not stored; they are computed from the message store
//! at read time. These types carry the query results upward.

use crate::entities::{Message, UserProfile};
use crate::value_objects::Snowflake;

/// One conversation as it appears in a user's recent-conversations list
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    /// The other participant
    pub partner: UserProfile,
    /// Newest message exchanged with the partner
    pub last_message: Message,
    /// Messages from the partner that the user has not read yet
    pub unread_count: i64,
}

/// Unread message count attributed to a single sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderUnread {
    pub sender_id: Snowflake,
    pub count: i64,
}
