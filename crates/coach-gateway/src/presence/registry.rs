//! Presence registry
//!
//! Tracks which users are online and which connections belong to each of
//! them. A user is online while at least one registered connection exists;
//! the first handle flips them online and removing the last flips them
//! offline. Both transitions are decided inside the map entry so two
//! devices racing cannot both observe a transition.
//!
//! State lives only in this process. A restart empties the registry and
//! every client reconnects.

use crate::connection::Connection;
use crate::protocol::ServerEvent;
use coach_core::Snowflake;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a register/unregister call did to the user's online state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// First handle for this user
    CameOnline,
    /// User already had other handles
    AlreadyOnline,
    /// Last handle removed
    WentOffline,
    /// Other handles remain
    StillOnline,
    /// The handle was not registered
    NotRegistered,
}

/// Registry of online users and their connection handles
pub struct PresenceRegistry {
    /// user_id -> connection handles for that user's devices
    sessions: DashMap<Snowflake, Vec<Arc<Connection>>>,
}

impl PresenceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Register an authenticated connection under its user
    pub fn register(&self, conn: Arc<Connection>) -> PresenceTransition {
        match self.sessions.entry(conn.user_id()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().push(conn);
                PresenceTransition::AlreadyOnline
            }
            Entry::Vacant(entry) => {
                entry.insert(vec![conn]);
                PresenceTransition::CameOnline
            }
        }
    }

    /// Remove a connection handle; drops the user entry when it was the last
    pub fn unregister(&self, user_id: Snowflake, connection_id: &str) -> PresenceTransition {
        match self.sessions.entry(user_id) {
            Entry::Occupied(mut entry) => {
                let handles = entry.get_mut();
                let before = handles.len();
                handles.retain(|c| c.id() != connection_id);

                if handles.len() == before {
                    PresenceTransition::NotRegistered
                } else if handles.is_empty() {
                    entry.remove();
                    PresenceTransition::WentOffline
                } else {
                    PresenceTransition::StillOnline
                }
            }
            Entry::Vacant(_) => PresenceTransition::NotRegistered,
        }
    }

    /// Check if a user has at least one live connection
    #[must_use]
    pub fn is_online(&self, user_id: Snowflake) -> bool {
        self.sessions.contains_key(&user_id)
    }

    /// Number of online users
    #[must_use]
    pub fn online_users(&self) -> usize {
        self.sessions.len()
    }

    /// Number of handles registered for a user
    #[must_use]
    pub fn connection_count(&self, user_id: Snowflake) -> usize {
        self.sessions.get(&user_id).map_or(0, |h| h.len())
    }

    /// Total handles across all users
    #[must_use]
    pub fn total_connections(&self) -> usize {
        self.sessions.iter().map(|entry| entry.value().len()).sum()
    }

    /// Snapshot of a user's current handles
    #[must_use]
    pub fn connections_for(&self, user_id: Snowflake) -> Vec<Arc<Connection>> {
        self.sessions
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Deliver an event to every handle a user has
    ///
    /// Returns how many handles accepted the frame. An offline user yields
    /// zero; delivery to them happens on their next history fetch.
    pub async fn send_to_user(&self, user_id: Snowflake, event: &ServerEvent) -> usize {
        let handles = match self.sessions.get(&user_id) {
            Some(entry) => entry.value().clone(),
            None => return 0,
        };

        let mut delivered = 0;
        for conn in handles {
            match conn.send(event.clone()).await {
                Ok(()) => delivered += 1,
                Err(_) => {
                    debug!(
                        user_id = %user_id,
                        connection_id = %conn.id(),
                        "send task gone, skipping handle"
                    );
                }
            }
        }
        delivered
    }

    /// Deliver an event to a user's handles except one connection
    ///
    /// Used to echo a message to the sender's other devices without
    /// bouncing it back to the device that sent it.
    pub async fn send_to_user_except(
        &self,
        user_id: Snowflake,
        skip_connection_id: &str,
        event: &ServerEvent,
    ) -> usize {
        let handles = match self.sessions.get(&user_id) {
            Some(entry) => entry.value().clone(),
            None => return 0,
        };

        let mut delivered = 0;
        for conn in handles {
            if conn.id() == skip_connection_id {
                continue;
            }
            if conn.send(event.clone()).await.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Deliver an event to every online user
    pub async fn broadcast(&self, event: &ServerEvent) -> usize {
        let handles: Vec<Arc<Connection>> = self
            .sessions
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();

        let mut delivered = 0;
        for conn in handles {
            match conn.send(event.clone()).await {
                Ok(()) => delivered += 1,
                Err(_) => {
                    warn!(connection_id = %conn.id(), "broadcast skipped dead handle");
                }
            }
        }
        delivered
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PresenceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceRegistry")
            .field("online_users", &self.online_users())
            .field("total_connections", &self.total_connections())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Outbound, UserContext};
    use coach_core::UserRole;
    use tokio::sync::mpsc;

    fn make_conn(
        user_id: i64,
        conn_id: &str,
    ) -> (Arc<Connection>, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(16);
        let conn = Connection::new(
            conn_id.to_string(),
            UserContext {
                user_id: Snowflake::new(user_id),
                display_name: format!("user-{user_id}"),
                role: UserRole::Client,
            },
            tx,
        );
        (conn, rx)
    }

    fn error_event() -> ServerEvent {
        ServerEvent::Error {
            code: "TEST".to_string(),
            message: "test".to_string(),
            retryable: false,
        }
    }

    #[tokio::test]
    async fn test_first_handle_comes_online() {
        let registry = PresenceRegistry::new();
        let (conn, _rx) = make_conn(1, "a");

        assert!(!registry.is_online(Snowflake::new(1)));
        assert_eq!(registry.register(conn), PresenceTransition::CameOnline);
        assert!(registry.is_online(Snowflake::new(1)));
    }

    #[tokio::test]
    async fn test_second_device_is_already_online() {
        let registry = PresenceRegistry::new();
        let (phone, _rx1) = make_conn(1, "phone");
        let (laptop, _rx2) = make_conn(1, "laptop");

        assert_eq!(registry.register(phone), PresenceTransition::CameOnline);
        assert_eq!(registry.register(laptop), PresenceTransition::AlreadyOnline);
        assert_eq!(registry.connection_count(Snowflake::new(1)), 2);
        assert_eq!(registry.online_users(), 1);
    }

    #[tokio::test]
    async fn test_offline_only_after_last_handle() {
        let registry = PresenceRegistry::new();
        let (phone, _rx1) = make_conn(1, "phone");
        let (laptop, _rx2) = make_conn(1, "laptop");
        registry.register(phone);
        registry.register(laptop);

        assert_eq!(
            registry.unregister(Snowflake::new(1), "phone"),
            PresenceTransition::StillOnline
        );
        assert!(registry.is_online(Snowflake::new(1)));

        assert_eq!(
            registry.unregister(Snowflake::new(1), "laptop"),
            PresenceTransition::WentOffline
        );
        assert!(!registry.is_online(Snowflake::new(1)));
        assert_eq!(registry.online_users(), 0);
    }

    #[tokio::test]
    async fn test_unregister_unknown_handle() {
        let registry = PresenceRegistry::new();
        let (conn, _rx) = make_conn(1, "a");
        registry.register(conn);

        assert_eq!(
            registry.unregister(Snowflake::new(1), "ghost"),
            PresenceTransition::NotRegistered
        );
        assert_eq!(
            registry.unregister(Snowflake::new(2), "a"),
            PresenceTransition::NotRegistered
        );
        assert!(registry.is_online(Snowflake::new(1)));
    }

    #[tokio::test]
    async fn test_send_to_user_reaches_all_devices() {
        let registry = PresenceRegistry::new();
        let (phone, mut rx1) = make_conn(1, "phone");
        let (laptop, mut rx2) = make_conn(1, "laptop");
        registry.register(phone);
        registry.register(laptop);

        let delivered = registry.send_to_user(Snowflake::new(1), &error_event()).await;
        assert_eq!(delivered, 2);
        assert!(matches!(rx1.recv().await, Some(Outbound::Event(_))));
        assert!(matches!(rx2.recv().await, Some(Outbound::Event(_))));
    }

    #[tokio::test]
    async fn test_send_to_offline_user_delivers_nothing() {
        let registry = PresenceRegistry::new();
        let delivered = registry.send_to_user(Snowflake::new(9), &error_event()).await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_send_to_user_except_skips_origin_device() {
        let registry = PresenceRegistry::new();
        let (phone, mut rx1) = make_conn(1, "phone");
        let (laptop, mut rx2) = make_conn(1, "laptop");
        registry.register(phone);
        registry.register(laptop);

        let delivered = registry
            .send_to_user_except(Snowflake::new(1), "phone", &error_event())
            .await;
        assert_eq!(delivered, 1);
        assert!(matches!(rx2.recv().await, Some(Outbound::Event(_))));
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_user() {
        let registry = PresenceRegistry::new();
        let (a, mut rx_a) = make_conn(1, "a");
        let (b, mut rx_b) = make_conn(2, "b");
        registry.register(a);
        registry.register(b);

        let delivered = registry.broadcast(&error_event()).await;
        assert_eq!(delivered, 2);
        assert!(matches!(rx_a.recv().await, Some(Outbound::Event(_))));
        assert!(matches!(rx_b.recv().await, Some(Outbound::Event(_))));
    }

    #[tokio::test]
    async fn test_concurrent_registration_single_online_transition() {
        let registry = Arc::new(PresenceRegistry::new());
        let mut tasks = Vec::new();

        for i in 0..16 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                let (conn, rx) = make_conn(1, &format!("c{i}"));
                // keep the receiver alive for the duration of the task
                let transition = registry.register(conn);
                drop(rx);
                transition
            }));
        }

        let mut online_transitions = 0;
        for task in tasks {
            if task.await.unwrap() == PresenceTransition::CameOnline {
                online_transitions += 1;
            }
        }

        assert_eq!(online_transitions, 1);
        assert_eq!(registry.connection_count(Snowflake::new(1)), 16);
    }

    #[tokio::test]
    async fn test_concurrent_unregister_single_offline_transition() {
        let registry = Arc::new(PresenceRegistry::new());
        let mut receivers = Vec::new();
        for i in 0..16 {
            let (conn, rx) = make_conn(1, &format!("c{i}"));
            registry.register(conn);
            receivers.push(rx);
        }

        let mut tasks = Vec::new();
        for i in 0..16 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                registry.unregister(Snowflake::new(1), &format!("c{i}"))
            }));
        }

        let mut offline_transitions = 0;
        for task in tasks {
            if task.await.unwrap() == PresenceTransition::WentOffline {
                offline_transitions += 1;
            }
        }

        assert_eq!(offline_transitions, 1);
        assert!(!registry.is_online(Snowflake::new(1)));
    }
}
