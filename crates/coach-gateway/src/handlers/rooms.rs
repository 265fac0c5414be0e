//! Conversation focus handler

use super::HandlerResult;
use crate::connection::Connection;
use crate::server::GatewayState;
use coach_core::Snowflake;
use std::sync::Arc;

/// Handles `join_conversation` and `leave_conversation`
///
/// Focus state lives on the connection and dies with it; a fresh
/// connection starts unfocused.
pub struct FocusHandler;

impl FocusHandler {
    pub fn handle_join(
        _state: &GatewayState,
        connection: &Arc<Connection>,
        partner_id: Snowflake,
    ) -> HandlerResult<()> {
        connection.focus_conversation(partner_id);
        tracing::trace!(
            user_id = %connection.user_id(),
            partner_id = %partner_id,
            "conversation focused"
        );
        Ok(())
    }

    pub fn handle_leave(
        _state: &GatewayState,
        connection: &Arc<Connection>,
        partner_id: Snowflake,
    ) -> HandlerResult<()> {
        connection.unfocus_conversation(partner_id);
        tracing::trace!(
            user_id = %connection.user_id(),
            partner_id = %partner_id,
            "conversation unfocused"
        );
        Ok(())
    }
}
