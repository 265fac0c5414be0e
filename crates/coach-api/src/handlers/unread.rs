//! Unread badge handlers

use axum::extract::State;
use axum::Json;
use coach_service::{ChatService, UnreadCountsResponse};

use crate::extractors::AuthUser;
use crate::response::ApiResult;
use crate::state::AppState;

/// Unread totals for the authenticated user
///
/// GET /chat/unread
pub async fn get_unread_counts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCountsResponse>> {
    let service = ChatService::new(state.service_context());
    let counts = service.unread_counts(auth.user_id).await?;
    Ok(Json(counts))
}
