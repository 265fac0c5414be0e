//! Domain error type shared by every layer above coach-core

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Errors produced by domain rules and repository operations
#[derive(Debug, Error)]
pub enum DomainError {
    // === Not found ===
    #[error("message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("user not found: {0}")]
    UserNotFound(Snowflake),

    // === Authorization ===
    #[error("no active coaching relationship between these users")]
    ChatNotAllowed,

    #[error("only the sender may delete a message")]
    NotMessageSender,

    // === Validation ===
    #[error("cannot send a message to yourself")]
    SelfAddressedMessage,

    #[error("message body cannot be empty")]
    EmptyBody,

    #[error("message body exceeds {max} characters")]
    BodyTooLong { max: usize },

    #[error("image and file messages require at least one attachment")]
    MissingAttachments,

    #[error("validation error: {0}")]
    ValidationError(String),

    // === Infrastructure ===
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Stable machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MessageNotFound(_) => "MESSAGE_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::ChatNotAllowed => "CHAT_NOT_ALLOWED",
            Self::NotMessageSender => "NOT_MESSAGE_SENDER",
            Self::SelfAddressedMessage => "SELF_ADDRESSED_MESSAGE",
            Self::EmptyBody => "EMPTY_BODY",
            Self::BodyTooLong { .. } => "BODY_TOO_LONG",
            Self::MissingAttachments => "MISSING_ATTACHMENTS",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// True for missing-resource errors (HTTP 404 family)
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::MessageNotFound(_) | Self::UserNotFound(_))
    }

    /// True for request-shape errors the caller can fix (HTTP 400 family)
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::SelfAddressedMessage
                | Self::EmptyBody
                | Self::BodyTooLong { .. }
                | Self::MissingAttachments
                | Self::ValidationError(_)
        )
    }

    /// True for permission errors (HTTP 403 family)
    #[must_use]
    pub const fn is_authorization(&self) -> bool {
        matches!(self, Self::ChatNotAllowed | Self::NotMessageSender)
    }

    /// True for errors worth retrying on the client side
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::InternalError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(DomainError::MessageNotFound(Snowflake::new(1)).is_not_found());
        assert!(DomainError::ChatNotAllowed.is_authorization());
        assert!(DomainError::NotMessageSender.is_authorization());
        assert!(DomainError::EmptyBody.is_validation());
        assert!(DomainError::BodyTooLong { max: 2000 }.is_validation());
        assert!(DomainError::DatabaseError("pool timeout".into()).is_transient());

        assert!(!DomainError::ChatNotAllowed.is_validation());
        assert!(!DomainError::EmptyBody.is_transient());
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(DomainError::ChatNotAllowed.code(), "CHAT_NOT_ALLOWED");
        assert_eq!(
            DomainError::MessageNotFound(Snowflake::new(7)).code(),
            "MESSAGE_NOT_FOUND"
        );
        assert_eq!(DomainError::BodyTooLong { max: 2000 }.code(), "BODY_TOO_LONG");
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::MessageNotFound(Snowflake::new(42));
        assert_eq!(err.to_string(), "message not found: 42");
    }
}
