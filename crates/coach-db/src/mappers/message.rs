//! Message entity <-> model mapper

use coach_core::{Message, MessageKind, Snowflake};

use crate::models::MessageModel;

/// Convert MessageModel to Message entity
impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            sender_id: Snowflake::new(model.sender_id),
            receiver_id: Snowflake::new(model.receiver_id),
            // The kind column carries a CHECK constraint on the known values
            kind: MessageKind::parse(&model.kind).unwrap_or(MessageKind::Text),
            body: model.body,
            attachments: model.attachments,
            created_at: model.created_at,
            is_read: model.is_read,
            read_at: model.read_at,
        }
    }
}
