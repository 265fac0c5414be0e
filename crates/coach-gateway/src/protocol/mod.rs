//! Wire protocol for the WebSocket gateway
//!
//! Clients send actions, the server sends events. Both sides use JSON text
//! frames with an `action`/`event` discriminator and camelCase payloads.

mod actions;
mod close_codes;
mod events;

pub use actions::ClientAction;
pub use close_codes::CloseCode;
pub use events::{PresenceStatus, ServerEvent};
