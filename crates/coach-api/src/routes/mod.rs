//! Route definitions
//!
//! All API routes organized by resource and mounted under /api/v1.

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{conversations, health, messages, unread};
use crate::state::AppState;

/// Create the main API router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass the middleware stack)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new().merge(chat_routes())
}

/// Chat routes
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/conversations", get(conversations::list_conversations))
        .route(
            "/chat/conversations/:partner_id/messages",
            get(conversations::get_conversation_messages),
        )
        .route(
            "/chat/conversations/:partner_id/search",
            get(conversations::search_conversation),
        )
        .route(
            "/chat/conversations/:partner_id/read",
            post(messages::mark_conversation_read),
        )
        .route("/chat/messages/:message_id", delete(messages::delete_message))
        .route("/chat/unread", get(unread::get_unread_counts))
}
