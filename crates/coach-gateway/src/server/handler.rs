//! WebSocket handler
//!
//! Owns the connection lifecycle: the auth-first handshake, the read loop,
//! the outbound send task, and presence cleanup on disconnect.

use crate::connection::{Connection, Outbound, UserContext};
use crate::handlers::ActionDispatcher;
use crate::presence::{PresenceRegistry, PresenceTransition};
use crate::protocol::{ClientAction, CloseCode, PresenceStatus, ServerEvent};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// WebSocket gateway handler
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let (mut ws_sink, mut ws_stream) = socket.split();

    // Nothing is registered and nothing fans out until the first frame
    // authenticates. Failures close the socket with a coded frame.
    let user = match authenticate(&state, &mut ws_stream).await {
        Ok(user) => user,
        Err(code) => {
            tracing::debug!(close_code = %code, "handshake failed");
            send_close(&mut ws_sink, code).await;
            return;
        }
    };

    let connection_id = uuid::Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::channel::<Outbound>(state.config().gateway_tuning.send_buffer);
    let connection = Connection::new(connection_id.clone(), user, tx);

    tracing::info!(
        connection_id = %connection_id,
        user_id = %connection.user_id(),
        "client authenticated"
    );

    // The sink moves into the send task; from here on, frames and closes
    // travel through the connection's channel.
    let send_task = tokio::spawn(run_send_task(ws_sink, rx, connection_id.clone()));

    if state.presence().register(connection.clone()) == PresenceTransition::CameOnline {
        state
            .presence()
            .broadcast(&ServerEvent::user_status(
                connection.user_id(),
                PresenceStatus::Online,
            ))
            .await;
    }

    read_loop(&state, &connection, &mut ws_stream).await;

    cleanup_connection(&state, &connection).await;

    // Dropping the connection's sender ends the send task, which closes
    // the sink on its way out.
    drop(connection);
    let _ = send_task.await;
}

/// Run the auth-first handshake on a fresh socket
async fn authenticate(
    state: &GatewayState,
    ws_stream: &mut SplitStream<WebSocket>,
) -> Result<UserContext, CloseCode> {
    let deadline = Duration::from_secs(state.config().gateway_tuning.auth_timeout_secs);

    let frame = match timeout(deadline, ws_stream.next()).await {
        Err(_) => return Err(CloseCode::AuthenticationTimeout),
        Ok(None | Some(Err(_))) => return Err(CloseCode::UnknownError),
        Ok(Some(Ok(frame))) => frame,
    };

    let text = match frame {
        Message::Text(text) => text,
        Message::Close(_) => return Err(CloseCode::UnknownError),
        _ => return Err(CloseCode::DecodeError),
    };

    let action = ClientAction::from_json(&text).map_err(|e| {
        tracing::debug!(error = %e, "unparseable handshake frame");
        CloseCode::DecodeError
    })?;

    let token = match action {
        ClientAction::Authenticate { token } => token,
        other => {
            tracing::debug!(action = other.name(), "action before authentication");
            return Err(CloseCode::NotAuthenticated);
        }
    };

    let token = token.strip_prefix("Bearer ").unwrap_or(&token);

    let claims = state
        .service_context()
        .jwt_service()
        .verify_token(token)
        .map_err(|e| {
            tracing::debug!(error = %e, "token verification failed");
            CloseCode::AuthenticationFailed
        })?;

    let user_id = claims
        .user_id()
        .map_err(|_| CloseCode::AuthenticationFailed)?;

    // The token may outlive the account; the user row decides.
    let profile = state
        .service_context()
        .user_repo()
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "user lookup failed during handshake");
            CloseCode::UnknownError
        })?
        .ok_or(CloseCode::AuthenticationFailed)?;

    Ok(UserContext {
        user_id: profile.id,
        display_name: profile.display_name,
        role: profile.role,
    })
}

/// Pump the outbound channel into the socket
async fn run_send_task(
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Outbound>,
    connection_id: String,
) {
    while let Some(outbound) = rx.recv().await {
        match outbound {
            Outbound::Event(event) => {
                let json = match event.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!(
                            connection_id = %connection_id,
                            error = %e,
                            "failed to serialize event"
                        );
                        continue;
                    }
                };
                if ws_sink.send(Message::Text(json.into())).await.is_err() {
                    tracing::debug!(
                        connection_id = %connection_id,
                        "socket gone, stopping send task"
                    );
                    return;
                }
            }
            Outbound::Close(code) => {
                send_close(&mut ws_sink, code).await;
                return;
            }
        }
    }

    // Channel closed on disconnect; say goodbye properly.
    let _ = ws_sink.close().await;
}

/// Process incoming frames until the client goes away
async fn read_loop(
    state: &GatewayState,
    connection: &Arc<Connection>,
    ws_stream: &mut SplitStream<WebSocket>,
) {
    while let Some(frame) = ws_stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Err(close_code) = handle_text_frame(state, connection, &text).await {
                    tracing::debug!(
                        connection_id = %connection.id(),
                        close_code = %close_code,
                        "closing connection"
                    );
                    let _ = connection.close(close_code).await;
                    return;
                }
            }
            Ok(Message::Binary(_)) => {
                tracing::debug!(
                    connection_id = %connection.id(),
                    "binary frames not supported"
                );
                let _ = connection.close(CloseCode::DecodeError).await;
                return;
            }
            // Ping is answered by axum; pong needs no action
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection.id(), "client closed connection");
                return;
            }
            Err(e) => {
                tracing::warn!(
                    connection_id = %connection.id(),
                    error = %e,
                    "WebSocket error"
                );
                return;
            }
        }
    }
}

/// Handle a text frame from an authenticated client
async fn handle_text_frame(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) -> Result<(), CloseCode> {
    let action = match ClientAction::from_json(text) {
        Ok(action) => action,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "failed to parse frame"
            );
            return Err(CloseCode::DecodeError);
        }
    };

    match ActionDispatcher::dispatch(state, connection, action).await {
        Ok(Some(close_code)) => Err(close_code),
        Ok(None) => Ok(()),
        Err(e) => {
            // Domain failures go back in-band; only protocol violations
            // and internal faults terminate the connection.
            if let Some(event) = e.to_error_event() {
                tracing::debug!(
                    connection_id = %connection.id(),
                    error = %e,
                    "action failed"
                );
                let _ = connection.send(event).await;
                return Ok(());
            }

            tracing::warn!(
                connection_id = %connection.id(),
                error = %e,
                "handler error"
            );
            Err(e.to_close_code().unwrap_or(CloseCode::UnknownError))
        }
    }
}

/// Drop the handle from presence and broadcast offline on the last one
async fn cleanup_connection(state: &GatewayState, connection: &Arc<Connection>) {
    let transition = state
        .presence()
        .unregister(connection.user_id(), connection.id());

    tracing::info!(
        connection_id = %connection.id(),
        user_id = %connection.user_id(),
        transition = ?transition,
        "connection cleaned up"
    );

    if should_broadcast_offline(state.presence(), connection.user_id(), transition) {
        state
            .presence()
            .broadcast(&ServerEvent::user_status(
                connection.user_id(),
                PresenceStatus::Offline,
            ))
            .await;
    }
}

/// Whether dropping this handle should announce the user as offline.
///
/// A reconnect can land between `unregister` and the broadcast; without
/// the presence re-check, a fresh `online` status could be followed by
/// this handle's stale `offline`.
fn should_broadcast_offline(
    presence: &PresenceRegistry,
    user_id: coach_core::Snowflake,
    transition: PresenceTransition,
) -> bool {
    transition == PresenceTransition::WentOffline && !presence.is_online(user_id)
}

/// Send a coded close frame and shut the sink
async fn send_close(ws_sink: &mut SplitSink<WebSocket, Message>, code: CloseCode) {
    let frame = CloseFrame {
        code: code.as_u16(),
        reason: code.description().into(),
    };
    let _ = ws_sink.send(Message::Close(Some(frame))).await;
    let _ = ws_sink.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::{Snowflake, UserRole};

    fn connect(registry: &PresenceRegistry, id: &str, user_id: Snowflake) -> Arc<Connection> {
        let (tx, _rx) = mpsc::channel(8);
        let conn = Connection::new(
            id.to_string(),
            UserContext {
                user_id,
                display_name: format!("user-{user_id}"),
                role: UserRole::Client,
            },
            tx,
        );
        registry.register(conn.clone());
        conn
    }

    #[tokio::test]
    async fn test_offline_broadcast_on_last_handle() {
        let registry = PresenceRegistry::new();
        let user = Snowflake::new(7);

        let conn = connect(&registry, "c1", user);
        let transition = registry.unregister(user, conn.id());

        assert_eq!(transition, PresenceTransition::WentOffline);
        assert!(should_broadcast_offline(&registry, user, transition));
    }

    #[tokio::test]
    async fn test_offline_broadcast_suppressed_after_reconnect() {
        let registry = PresenceRegistry::new();
        let user = Snowflake::new(7);

        let old = connect(&registry, "c1", user);
        let transition = registry.unregister(user, old.id());
        assert_eq!(transition, PresenceTransition::WentOffline);

        // Reconnect lands before the old handle gets to broadcast.
        let _fresh = connect(&registry, "c2", user);

        assert!(!should_broadcast_offline(&registry, user, transition));
    }

    #[tokio::test]
    async fn test_offline_broadcast_skipped_while_other_devices_remain() {
        let registry = PresenceRegistry::new();
        let user = Snowflake::new(7);

        let phone = connect(&registry, "c1", user);
        let _laptop = connect(&registry, "c2", user);

        let transition = registry.unregister(user, phone.id());
        assert_eq!(transition, PresenceTransition::StillOnline);
        assert!(!should_broadcast_offline(&registry, user, transition));
    }
}
