//! Individual WebSocket connection
//!
//! A `Connection` exists only after authentication succeeds, so its user
//! context is immutable for the connection's whole lifetime. Re-binding a
//! socket to another user requires a fresh connection.

use crate::protocol::{CloseCode, ServerEvent};
use coach_core::{Snowflake, UserRole};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Frames queued toward the socket's send task
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A JSON event frame
    Event(ServerEvent),
    /// Close the socket with the given code
    Close(CloseCode),
}

/// Identity bound to a connection at authentication time
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: Snowflake,
    pub display_name: String,
    pub role: UserRole,
}

/// A single authenticated WebSocket connection
pub struct Connection {
    /// Unique connection handle ID
    id: String,

    /// Authenticated identity (fixed at construction)
    user: UserContext,

    /// Channel toward the socket's send task
    sender: mpsc::Sender<Outbound>,

    /// Conversations focused on this device
    focused: RwLock<HashSet<Snowflake>>,

    /// Connection creation time
    connected_at: Instant,
}

impl Connection {
    /// Create a new connection for an authenticated user
    pub fn new(id: String, user: UserContext, sender: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            id,
            user,
            sender,
            focused: RwLock::new(HashSet::new()),
            connected_at: Instant::now(),
        })
    }

    /// Get the connection handle ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the authenticated user ID
    pub fn user_id(&self) -> Snowflake {
        self.user.user_id
    }

    /// Get the full user context
    pub fn user(&self) -> &UserContext {
        &self.user
    }

    /// Mark a conversation as focused on this device
    pub fn focus_conversation(&self, partner_id: Snowflake) {
        self.focused.write().insert(partner_id);
    }

    /// Clear a focused conversation
    pub fn unfocus_conversation(&self, partner_id: Snowflake) {
        self.focused.write().remove(&partner_id);
    }

    /// Check whether a conversation is focused on this device
    pub fn is_focused_on(&self, partner_id: Snowflake) -> bool {
        self.focused.read().contains(&partner_id)
    }

    /// Get connection age
    pub fn age(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }

    /// Queue an event toward this connection
    pub async fn send(&self, event: ServerEvent) -> Result<(), mpsc::error::SendError<Outbound>> {
        self.sender.send(Outbound::Event(event)).await
    }

    /// Queue an event without waiting; a full queue drops the frame
    pub fn try_send(&self, event: ServerEvent) -> Result<(), mpsc::error::TrySendError<Outbound>> {
        self.sender.try_send(Outbound::Event(event))
    }

    /// Ask the send task to close the socket
    pub async fn close(&self, code: CloseCode) -> Result<(), mpsc::error::SendError<Outbound>> {
        self.sender.send(Outbound::Close(code)).await
    }

    /// Check if the send task has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("user_id", &self.user.user_id)
            .field("connected_at", &self.connected_at)
            .finish()
    }
}
