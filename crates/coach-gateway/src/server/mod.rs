//! Gateway server setup
//!
//! Provides the WebSocket server configuration and routes.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use crate::presence::PresenceRegistry;
use axum::{routing::get, Router};
use coach_common::{AppConfig, AppError};
use coach_service::ServiceContextBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies and create `GatewayState`
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    tracing::info!("Connecting to PostgreSQL...");
    let db_config = coach_db::DatabaseConfig::new(config.database.url.clone())
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections);
    let pool = coach_db::create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    let jwt_service = Arc::new(coach_common::JwtService::new(
        &config.jwt.secret,
        config.jwt.token_expiry,
    ));

    let snowflake_generator = Arc::new(coach_core::SnowflakeGenerator::new(
        config.snowflake.worker_id,
    ));

    let message_repo = Arc::new(coach_db::PgMessageRepository::new(pool.clone()));
    let relationship_repo = Arc::new(coach_db::PgRelationshipRepository::new(pool.clone()));
    let user_repo = Arc::new(coach_db::PgUserRepository::new(pool));

    let service_context = ServiceContextBuilder::new()
        .message_repo(message_repo)
        .relationship_repo(relationship_repo)
        .user_repo(user_repo)
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let presence = Arc::new(PresenceRegistry::new());

    Ok(GatewayState::new(service_context, presence, config))
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting Gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/gateway", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.gateway.port));

    let state = create_gateway_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
