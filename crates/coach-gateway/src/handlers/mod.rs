//! Action handlers
//!
//! Handles incoming client frames based on their action tag. Every handler
//! runs on a connection that already authenticated; the handshake in
//! `server::handler` rejects everything else.

mod chat;
mod error;
mod rooms;
mod typing;

pub use chat::ChatHandler;
pub use error::{HandlerError, HandlerResult};
pub use rooms::FocusHandler;
pub use typing::TypingHandler;

use crate::connection::Connection;
use crate::protocol::{ClientAction, CloseCode};
use crate::server::GatewayState;
use std::sync::Arc;

/// Dispatch incoming client actions to the matching handler
pub struct ActionDispatcher;

impl ActionDispatcher {
    /// Handle a decoded client action
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        action: ClientAction,
    ) -> HandlerResult<Option<CloseCode>> {
        tracing::trace!(
            connection_id = %connection.id(),
            action = action.name(),
            "dispatching action"
        );

        match action {
            // The connection carries a fixed identity; a second
            // authenticate frame is a protocol violation.
            ClientAction::Authenticate { .. } => {
                tracing::warn!(
                    connection_id = %connection.id(),
                    user_id = %connection.user_id(),
                    "authenticate sent on an authenticated connection"
                );
                Ok(Some(CloseCode::AlreadyAuthenticated))
            }
            ClientAction::SendMessage {
                receiver_id,
                message,
                message_type,
                attachments,
            } => {
                ChatHandler::handle_send(
                    state,
                    connection,
                    receiver_id,
                    message,
                    message_type,
                    attachments,
                )
                .await?;
                Ok(None)
            }
            ClientAction::MarkAsRead { sender_id } => {
                ChatHandler::handle_mark_read(state, connection, sender_id).await?;
                Ok(None)
            }
            ClientAction::TypingStart { receiver_id } => {
                TypingHandler::handle(state, connection, receiver_id, true).await?;
                Ok(None)
            }
            ClientAction::TypingStop { receiver_id } => {
                TypingHandler::handle(state, connection, receiver_id, false).await?;
                Ok(None)
            }
            ClientAction::JoinConversation { partner_id } => {
                FocusHandler::handle_join(state, connection, partner_id)?;
                Ok(None)
            }
            ClientAction::LeaveConversation { partner_id } => {
                FocusHandler::handle_leave(state, connection, partner_id)?;
                Ok(None)
            }
        }
    }
}
