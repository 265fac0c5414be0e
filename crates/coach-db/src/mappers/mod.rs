//! Entity to model mappers
//!
//! Conversions between domain entities (coach-core) and database models.
//! `From<Model> for Entity` converts database rows to domain objects.

mod conversation;
mod message;
mod user;
