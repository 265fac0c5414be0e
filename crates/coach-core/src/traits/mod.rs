//! Repository abstractions implemented by the infrastructure layer

mod repositories;

pub use repositories::{
    MessageRepository, Page, RelationshipRepository, RepoResult, UserRepository,
};
