//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in coach-core.

mod error;
mod message;
mod relationship;
mod user;

pub use message::PgMessageRepository;
pub use relationship::PgRelationshipRepository;
pub use user::PgUserRepository;
