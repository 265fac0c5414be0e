//! Message entity - one direct message between a trainer and a client
//!
//! Immutable once created, except for the read-state pair (`is_read`,
//! `read_at`) which transitions false -> true exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Maximum message body length in Unicode code points
pub const MAX_BODY_CHARS: usize = 2000;

/// Message content kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    File,
}

impl MessageKind {
    /// String form used on the wire and in storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
        }
    }

    /// Parse the storage/wire string form
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            "file" => Some(Self::File),
            _ => None,
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    pub kind: MessageKind,
    pub body: String,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a new unread Message, validating the content rules
    pub fn new(
        id: Snowflake,
        sender_id: Snowflake,
        receiver_id: Snowflake,
        kind: MessageKind,
        body: String,
        attachments: Vec<String>,
    ) -> Result<Self, DomainError> {
        Self::validate(sender_id, receiver_id, kind, &body, &attachments)?;

        Ok(Self {
            id,
            sender_id,
            receiver_id,
            kind,
            body,
            attachments,
            created_at: Utc::now(),
            is_read: false,
            read_at: None,
        })
    }

    /// Validate the content rules without constructing a Message
    ///
    /// Rules:
    /// - sender and receiver must differ
    /// - text messages carry a 1-2000 code point body
    /// - image/file messages require at least one attachment; their body is
    ///   optional but still bounded
    pub fn validate(
        sender_id: Snowflake,
        receiver_id: Snowflake,
        kind: MessageKind,
        body: &str,
        attachments: &[String],
    ) -> Result<(), DomainError> {
        if sender_id == receiver_id {
            return Err(DomainError::SelfAddressedMessage);
        }

        let body_chars = body.chars().count();
        if body_chars > MAX_BODY_CHARS {
            return Err(DomainError::BodyTooLong {
                max: MAX_BODY_CHARS,
            });
        }

        match kind {
            MessageKind::Text => {
                if body_chars == 0 {
                    return Err(DomainError::EmptyBody);
                }
            }
            MessageKind::Image | MessageKind::File => {
                if attachments.is_empty() {
                    return Err(DomainError::MissingAttachments);
                }
            }
        }

        Ok(())
    }

    /// Mark the message read; idempotent, `read_at` is set exactly once
    pub fn mark_read(&mut self) {
        if !self.is_read {
            self.is_read = true;
            self.read_at = Some(Utc::now());
        }
    }

    /// Check whether a user is one of the two participants
    #[inline]
    pub fn involves(&self, user_id: Snowflake) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    /// The other participant from `user_id`'s point of view
    pub fn partner_of(&self, user_id: Snowflake) -> Snowflake {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    /// Truncated body preview (for notifications), bounded in code points
    pub fn preview(&self, max_chars: usize) -> String {
        if self.body.chars().count() <= max_chars {
            self.body.clone()
        } else {
            self.body.chars().take(max_chars).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_message(sender: i64, receiver: i64, body: &str) -> Result<Message, DomainError> {
        Message::new(
            Snowflake::new(1),
            Snowflake::new(sender),
            Snowflake::new(receiver),
            MessageKind::Text,
            body.to_string(),
            vec![],
        )
    }

    #[test]
    fn test_text_message_creation() {
        let msg = text_message(10, 20, "Nice work on today's session").unwrap();
        assert!(!msg.is_read);
        assert!(msg.read_at.is_none());
        assert_eq!(msg.kind, MessageKind::Text);
    }

    #[test]
    fn test_self_addressed_message_rejected() {
        let err = text_message(10, 10, "hello").unwrap_err();
        assert!(matches!(err, DomainError::SelfAddressedMessage));
    }

    #[test]
    fn test_empty_text_body_rejected() {
        let err = text_message(10, 20, "").unwrap_err();
        assert!(matches!(err, DomainError::EmptyBody));
    }

    #[test]
    fn test_oversized_body_rejected() {
        let body = "x".repeat(MAX_BODY_CHARS + 1);
        let err = text_message_body(&body).unwrap_err();
        assert!(matches!(err, DomainError::BodyTooLong { .. }));

        // Exactly at the limit is fine
        let body = "x".repeat(MAX_BODY_CHARS);
        assert!(text_message_body(&body).is_ok());
    }

    fn text_message_body(body: &str) -> Result<Message, DomainError> {
        text_message(10, 20, body)
    }

    #[test]
    fn test_attachment_message_requires_attachments() {
        let err = Message::new(
            Snowflake::new(1),
            Snowflake::new(10),
            Snowflake::new(20),
            MessageKind::Image,
            String::new(),
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::MissingAttachments));

        let msg = Message::new(
            Snowflake::new(1),
            Snowflake::new(10),
            Snowflake::new(20),
            MessageKind::Image,
            String::new(),
            vec!["https://cdn.example.com/progress.jpg".to_string()],
        )
        .unwrap();
        assert_eq!(msg.attachments.len(), 1);
    }

    #[test]
    fn test_mark_read_is_monotonic() {
        let mut msg = text_message(10, 20, "hi").unwrap();
        msg.mark_read();
        assert!(msg.is_read);
        let first_read_at = msg.read_at;
        assert!(first_read_at.is_some());

        // Second call must not move read_at
        msg.mark_read();
        assert!(msg.is_read);
        assert_eq!(msg.read_at, first_read_at);
    }

    #[test]
    fn test_partner_of() {
        let msg = text_message(10, 20, "hi").unwrap();
        assert_eq!(msg.partner_of(Snowflake::new(10)), Snowflake::new(20));
        assert_eq!(msg.partner_of(Snowflake::new(20)), Snowflake::new(10));
        assert!(msg.involves(Snowflake::new(10)));
        assert!(!msg.involves(Snowflake::new(30)));
    }

    #[test]
    fn test_preview_truncates_on_code_points() {
        let msg = text_message(10, 20, "días de entrenamiento duro por delante").unwrap();
        assert_eq!(msg.preview(4), "días");
        assert_eq!(msg.preview(100), msg.body);
    }

    #[test]
    fn test_kind_string_roundtrip() {
        for kind in [MessageKind::Text, MessageKind::Image, MessageKind::File] {
            assert_eq!(MessageKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MessageKind::parse("video"), None);
    }
}
