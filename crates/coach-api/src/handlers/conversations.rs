//! Conversation handlers
//!
//! Endpoints for the conversation index, per-partner history, and search.
//! All reads are keyed to the authenticated user; history with a former
//! trainer or client stays readable after the link ends.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use coach_service::{ChatService, ConversationResponse, MessageResponse};
use serde::Deserialize;

use crate::extractors::{AuthUser, Pagination, SearchQuery};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Query parameters for the conversation list
#[derive(Debug, Deserialize)]
pub struct ConversationListParams {
    #[serde(default)]
    pub limit: Option<u32>,
}

/// List conversations ordered by most recent activity
///
/// GET /chat/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ConversationListParams>,
) -> ApiResult<Json<Vec<ConversationResponse>>> {
    let service = ChatService::new(state.service_context());
    let conversations = service
        .recent_conversations(auth.user_id, params.limit.unwrap_or(10))
        .await?;
    Ok(Json(conversations))
}

/// Page through one conversation, newest first
///
/// GET /chat/conversations/{partner_id}/messages
pub async fn get_conversation_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(partner_id): Path<String>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let partner_id = partner_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid partner_id format"))?;

    let service = ChatService::new(state.service_context());
    let messages = service
        .conversation_history(auth.user_id, partner_id, pagination.page, pagination.page_size)
        .await?;
    Ok(Json(messages))
}

/// Search within one conversation
///
/// GET /chat/conversations/{partner_id}/search?q=...
pub async fn search_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(partner_id): Path<String>,
    SearchQuery(query): SearchQuery,
    pagination: Pagination,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let partner_id = partner_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid partner_id format"))?;

    let service = ChatService::new(state.service_context());
    let messages = service
        .search_conversation(
            auth.user_id,
            partner_id,
            &query,
            pagination.page,
            pagination.page_size,
        )
        .await?;
    Ok(Json(messages))
}
