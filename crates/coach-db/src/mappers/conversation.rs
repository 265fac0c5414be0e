//! Conversation row <-> summary mapper

use coach_core::{
    ConversationSummary, Message, MessageKind, SenderUnread, Snowflake, UserProfile, UserRole,
};

use crate::models::{ConversationRowModel, SenderUnreadModel};

/// Convert a recent-conversations row to a ConversationSummary.
/// The unread count is filled in by the repository from a separate aggregate.
impl From<ConversationRowModel> for ConversationSummary {
    fn from(row: ConversationRowModel) -> Self {
        ConversationSummary {
            partner: UserProfile {
                id: Snowflake::new(row.partner_id),
                display_name: row.partner_display_name,
                role: UserRole::parse(&row.partner_role).unwrap_or(UserRole::Client),
            },
            last_message: Message {
                id: Snowflake::new(row.id),
                sender_id: Snowflake::new(row.sender_id),
                receiver_id: Snowflake::new(row.receiver_id),
                kind: MessageKind::parse(&row.kind).unwrap_or(MessageKind::Text),
                body: row.body,
                attachments: row.attachments,
                created_at: row.created_at,
                is_read: row.is_read,
                read_at: row.read_at,
            },
            unread_count: 0,
        }
    }
}

impl From<SenderUnreadModel> for SenderUnread {
    fn from(model: SenderUnreadModel) -> Self {
        SenderUnread {
            sender_id: Snowflake::new(model.sender_id),
            count: model.count,
        }
    }
}
