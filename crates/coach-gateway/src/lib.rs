//! # coach-gateway
//!
//! WebSocket gateway for real-time bidirectional messaging.

pub mod connection;
pub mod handlers;
pub mod presence;
pub mod protocol;
pub mod server;

pub use server::run;
