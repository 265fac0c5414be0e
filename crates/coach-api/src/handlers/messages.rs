//! Message handlers
//!
//! Read-state transitions and deletion. Message creation happens over the
//! gateway, not here.

use axum::extract::{Path, State};
use axum::Json;
use coach_service::ChatService;
use serde::Serialize;

use crate::extractors::AuthUser;
use crate::response::{ApiError, ApiResult, NoContent};
use crate::state::AppState;

/// Response body for a read receipt
#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    /// How many messages changed state
    pub count: u64,
}

/// Mark everything from a partner as read
///
/// POST /chat/conversations/{partner_id}/read
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(partner_id): Path<String>,
) -> ApiResult<Json<MarkReadResponse>> {
    let partner_id = partner_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid partner_id format"))?;

    let service = ChatService::new(state.service_context());
    let count = service.mark_read(auth.user_id, partner_id).await?;
    Ok(Json(MarkReadResponse { count }))
}

/// Delete a message; only its sender may do so
///
/// DELETE /chat/messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<String>,
) -> ApiResult<NoContent> {
    let message_id = message_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid message_id format"))?;

    let service = ChatService::new(state.service_context());
    service.delete_message(auth.user_id, message_id).await?;
    Ok(NoContent)
}
