//! Database models - SQLx-compatible structs for PostgreSQL tables

mod conversation;
mod message;
mod user;

pub use conversation::{ConversationRowModel, SenderUnreadModel};
pub use message::MessageModel;
pub use user::UserModel;
