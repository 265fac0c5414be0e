//! Server events
//!
//! Every frame the server pushes is one of these, tagged by the `event`
//! field with a camelCase `data` payload.

use chrono::{DateTime, Utc};
use coach_core::Snowflake;
use coach_service::MessageResponse;
use serde::Serialize;

/// Online/offline marker carried by `user_status` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

/// Events the server pushes to clients
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Delivery of a stored message (to the receiver and to the sender's
    /// other devices)
    #[serde(rename_all = "camelCase")]
    NewMessage { message: MessageResponse },

    /// Acknowledgement to the sending connection
    #[serde(rename_all = "camelCase")]
    MessageSent {
        success: bool,
        message: MessageResponse,
    },

    /// The partner read everything we sent them
    #[serde(rename_all = "camelCase")]
    MessagesRead { reader_id: Snowflake, count: u64 },

    /// Typing indicator from a partner
    #[serde(rename_all = "camelCase")]
    UserTyping { user_id: Snowflake, is_typing: bool },

    /// A user came online or went offline
    #[serde(rename_all = "camelCase")]
    UserStatus {
        user_id: Snowflake,
        status: PresenceStatus,
        timestamp: DateTime<Utc>,
    },

    /// Lightweight notification with a body preview
    #[serde(rename_all = "camelCase")]
    Notification {
        #[serde(rename = "type")]
        kind: &'static str,
        sender_id: Snowflake,
        sender_name: String,
        message: String,
    },

    /// An action failed; sent only to the connection that acted
    #[serde(rename_all = "camelCase")]
    Error {
        code: String,
        message: String,
        retryable: bool,
    },
}

impl ServerEvent {
    /// Presence change event stamped with the current time
    #[must_use]
    pub fn user_status(user_id: Snowflake, status: PresenceStatus) -> Self {
        Self::UserStatus {
            user_id,
            status,
            timestamp: Utc::now(),
        }
    }

    /// New-message notification with a truncated body preview
    #[must_use]
    pub fn notification(sender_id: Snowflake, sender_name: String, preview: String) -> Self {
        Self::Notification {
            kind: "new_message",
            sender_id,
            sender_name,
            message: preview,
        }
    }

    /// Serialize to a JSON text frame
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Short name for logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewMessage { .. } => "new_message",
            Self::MessageSent { .. } => "message_sent",
            Self::MessagesRead { .. } => "messages_read",
            Self::UserTyping { .. } => "user_typing",
            Self::UserStatus { .. } => "user_status",
            Self::Notification { .. } => "notification",
            Self::Error { .. } => "error",
        }
    }
}
