//! Domain entities

mod conversation;
mod message;
mod user;

pub use conversation::{ConversationSummary, SenderUnread};
pub use message::{Message, MessageKind, MAX_BODY_CHARS};
pub use user::{UserProfile, UserRole};
