//! Send and read-state handlers

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::ServerEvent;
use crate::server::GatewayState;
use coach_core::{MessageKind, Snowflake};
use coach_service::{ChatService, MessageResponse};
use std::sync::Arc;

/// Characters kept in notification previews
const PREVIEW_CHARS: usize = 50;

/// Handles `send_message` and `mark_as_read`
pub struct ChatHandler;

impl ChatHandler {
    /// Store a message, ack the sender, and fan the event out.
    ///
    /// Fan-out order: ack to the acting connection first, then delivery to
    /// the receiver's devices, then an echo to the sender's other devices.
    /// An offline receiver gets nothing; they pick the message up from
    /// history on their next fetch.
    pub async fn handle_send(
        state: &GatewayState,
        connection: &Arc<Connection>,
        receiver_id: Snowflake,
        body: String,
        kind: MessageKind,
        attachments: Vec<String>,
    ) -> HandlerResult<()> {
        let sender_id = connection.user_id();

        let message = ChatService::new(state.service_context())
            .send_message(sender_id, receiver_id, kind, body, attachments)
            .await?;

        let preview = message.preview(PREVIEW_CHARS);
        let response = MessageResponse::from(message);

        // The message is already durable; a sender handle that died before
        // the ack must not block delivery to the receiver's devices.
        if connection
            .send(ServerEvent::MessageSent {
                success: true,
                message: response.clone(),
            })
            .await
            .is_err()
        {
            tracing::debug!(
                connection_id = %connection.id(),
                sender_id = %sender_id,
                "sender handle gone before ack, continuing fan-out"
            );
        }

        let delivered = state
            .presence()
            .send_to_user(
                receiver_id,
                &ServerEvent::NewMessage {
                    message: response.clone(),
                },
            )
            .await;

        // Suppress the notification while the receiver has this conversation
        // open on any device; the new_message frame already reached them.
        let receiver_focused = state
            .presence()
            .connections_for(receiver_id)
            .iter()
            .any(|c| c.is_focused_on(sender_id));

        if delivered > 0 && !receiver_focused {
            state
                .presence()
                .send_to_user(
                    receiver_id,
                    &ServerEvent::notification(
                        sender_id,
                        connection.user().display_name.clone(),
                        preview,
                    ),
                )
                .await;
        }

        state
            .presence()
            .send_to_user_except(
                sender_id,
                connection.id(),
                &ServerEvent::NewMessage { message: response },
            )
            .await;

        tracing::debug!(
            sender_id = %sender_id,
            receiver_id = %receiver_id,
            delivered,
            "message fanned out"
        );

        Ok(())
    }

    /// Mark everything from `sender_id` as read and tell their devices.
    ///
    /// Repeated calls are no-ops; the receipt only fires when rows changed.
    pub async fn handle_mark_read(
        state: &GatewayState,
        connection: &Arc<Connection>,
        sender_id: Snowflake,
    ) -> HandlerResult<()> {
        let reader_id = connection.user_id();

        let count = ChatService::new(state.service_context())
            .mark_read(reader_id, sender_id)
            .await?;

        if count > 0 {
            state
                .presence()
                .send_to_user(sender_id, &ServerEvent::MessagesRead { reader_id, count })
                .await;
        }

        Ok(())
    }
}
