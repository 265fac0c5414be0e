//! Request handlers
//!
//! Endpoint implementations organized by resource.

pub mod conversations;
pub mod health;
pub mod messages;
pub mod unread;
