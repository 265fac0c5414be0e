//! Handler error types

use crate::protocol::{CloseCode, ServerEvent};
use coach_service::ServiceError;
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Invalid payload received
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Service-level failure while acting on behalf of the client
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Close code for errors that terminate the connection.
    ///
    /// Service errors don't close the socket; the acting client gets an
    /// `error` event and the connection stays up.
    pub fn to_close_code(&self) -> Option<CloseCode> {
        match self {
            Self::InvalidPayload(_) => Some(CloseCode::DecodeError),
            Self::Service(_) => None,
            Self::Internal(_) => Some(CloseCode::UnknownError),
        }
    }

    /// Error event for failures reported in-band to the acting connection
    pub fn to_error_event(&self) -> Option<ServerEvent> {
        match self {
            Self::Service(err) => Some(ServerEvent::Error {
                code: err.error_code().to_string(),
                message: err.to_string(),
                retryable: err.is_retryable(),
            }),
            _ => None,
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
