//! Request extractors
//!
//! Custom Axum extractors for authentication, pagination, and query
//! validation.

mod auth;
mod pagination;
mod search;

pub use auth::AuthUser;
pub use pagination::Pagination;
pub use search::SearchQuery;
