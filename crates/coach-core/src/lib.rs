//! # coach-core
//!
//! Domain layer for the coaching chat backend: entities, value objects,
//! repository traits, and domain errors. This crate has zero dependencies on
//! infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    ConversationSummary, Message, MessageKind, SenderUnread, UserProfile, UserRole,
};
pub use error::DomainError;
pub use traits::{
    MessageRepository, Page, RelationshipRepository, RepoResult, UserRepository,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
