//! WebSocket connection types

mod connection;

pub use connection::{Connection, Outbound, UserContext};
