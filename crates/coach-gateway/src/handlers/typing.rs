//! Typing indicator handler

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::ServerEvent;
use crate::server::GatewayState;
use coach_core::Snowflake;
use std::sync::Arc;

/// Handles `typing_start` and `typing_stop`
///
/// Typing indicators are ephemeral: nothing is stored and an offline
/// receiver simply misses them.
pub struct TypingHandler;

impl TypingHandler {
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        receiver_id: Snowflake,
        is_typing: bool,
    ) -> HandlerResult<()> {
        let delivered = state
            .presence()
            .send_to_user(
                receiver_id,
                &ServerEvent::UserTyping {
                    user_id: connection.user_id(),
                    is_typing,
                },
            )
            .await;

        tracing::trace!(
            user_id = %connection.user_id(),
            receiver_id = %receiver_id,
            is_typing,
            delivered,
            "typing indicator forwarded"
        );

        Ok(())
    }
}
