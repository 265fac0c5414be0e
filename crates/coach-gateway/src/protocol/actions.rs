//! Client actions
//!
//! Every frame a client sends is one of these, tagged by the `action` field:
//!
//! ```json
//! {"action": "send_message", "data": {"receiverId": "42", "message": "hi"}}
//! ```

use coach_core::{MessageKind, Snowflake};
use serde::Deserialize;

/// Actions clients may send over the gateway
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum ClientAction {
    /// First frame on every connection; carries the JWT
    Authenticate { token: String },

    /// Send a message to another user
    #[serde(rename_all = "camelCase")]
    SendMessage {
        receiver_id: Snowflake,
        message: String,
        #[serde(rename = "messageType", default = "default_message_type")]
        message_type: MessageKind,
        #[serde(default)]
        attachments: Vec<String>,
    },

    /// Mark everything received from a sender as read
    #[serde(rename_all = "camelCase")]
    MarkAsRead { sender_id: Snowflake },

    /// Start a typing indicator toward a partner
    #[serde(rename_all = "camelCase")]
    TypingStart { receiver_id: Snowflake },

    /// Stop a typing indicator
    #[serde(rename_all = "camelCase")]
    TypingStop { receiver_id: Snowflake },

    /// Focus a conversation on this device
    #[serde(rename_all = "camelCase")]
    JoinConversation { partner_id: Snowflake },

    /// Leave a focused conversation
    #[serde(rename_all = "camelCase")]
    LeaveConversation { partner_id: Snowflake },
}

fn default_message_type() -> MessageKind {
    MessageKind::Text
}

impl ClientAction {
    /// Parse an incoming text frame
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Short name for logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Authenticate { .. } => "authenticate",
            Self::SendMessage { .. } => "send_message",
            Self::MarkAsRead { .. } => "mark_as_read",
            Self::TypingStart { .. } => "typing_start",
            Self::TypingStop { .. } => "typing_stop",
            Self::JoinConversation { .. } => "join_conversation",
            Self::LeaveConversation { .. } => "leave_conversation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_authenticate() {
        let action =
            ClientAction::from_json(r#"{"action":"authenticate","data":{"token":"abc.def.ghi"}}"#)
                .unwrap();
        assert!(matches!(action, ClientAction::Authenticate { token } if token == "abc.def.ghi"));
    }

    #[test]
    fn test_parse_send_message_defaults() {
        let action = ClientAction::from_json(
            r#"{"action":"send_message","data":{"receiverId":"42","message":"hello"}}"#,
        )
        .unwrap();

        match action {
            ClientAction::SendMessage {
                receiver_id,
                message,
                message_type,
                attachments,
            } => {
                assert_eq!(receiver_id, Snowflake::new(42));
                assert_eq!(message, "hello");
                assert_eq!(message_type, MessageKind::Text);
                assert!(attachments.is_empty());
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_parse_send_message_with_attachments() {
        let action = ClientAction::from_json(
            r#"{"action":"send_message","data":{"receiverId":42,"message":"","messageType":"image","attachments":["https://cdn.example.com/a.jpg"]}}"#,
        )
        .unwrap();

        match action {
            ClientAction::SendMessage {
                message_type,
                attachments,
                ..
            } => {
                assert_eq!(message_type, MessageKind::Image);
                assert_eq!(attachments.len(), 1);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_parse_mark_as_read() {
        let action = ClientAction::from_json(
            r#"{"action":"mark_as_read","data":{"senderId":"7"}}"#,
        )
        .unwrap();
        assert!(matches!(
            action,
            ClientAction::MarkAsRead { sender_id } if sender_id == Snowflake::new(7)
        ));
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(ClientAction::from_json(r#"{"action":"fly","data":{}}"#).is_err());
        assert!(ClientAction::from_json("not json at all").is_err());
    }
}
