//! Repository traits
//!
//! The service layer depends only on these traits; Postgres implementations
//! live in coach-db, and tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::entities::{ConversationSummary, Message, SenderUnread, UserProfile};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result alias for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// 1-based pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Page {
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Row offset for SQL OFFSET clauses
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.page_size as i64
    }

    /// Row limit for SQL LIMIT clauses
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, 50)
    }
}

/// Durable message storage
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message
    async fn append(&self, message: &Message) -> RepoResult<()>;

    /// Fetch a single message by id
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Messages between two users, newest first, ties broken by id
    async fn list_conversation(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
        page: Page,
    ) -> RepoResult<Vec<Message>>;

    /// Mark every unread message from `sender` to `receiver` as read.
    /// Returns the number of messages whose state changed.
    async fn mark_read(&self, sender: Snowflake, receiver: Snowflake) -> RepoResult<u64>;

    /// Total unread messages addressed to `receiver`
    async fn unread_count_for(&self, receiver: Snowflake) -> RepoResult<i64>;

    /// Unread counts addressed to `receiver`, grouped by sender
    async fn unread_by_sender(&self, receiver: Snowflake) -> RepoResult<Vec<SenderUnread>>;

    /// Case-insensitive substring search within one conversation,
    /// newest first
    async fn search(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
        query: &str,
        page: Page,
    ) -> RepoResult<Vec<Message>>;

    /// Permanently remove a message
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// A user's conversations ordered by most recent activity, each with
    /// its newest message and unread count
    async fn recent_conversations(
        &self,
        user_id: Snowflake,
        limit: u32,
    ) -> RepoResult<Vec<ConversationSummary>>;
}

/// Coaching relationship lookups
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Whether an active trainer/client link exists between the two users,
    /// in either direction
    async fn is_linked(&self, user_a: Snowflake, user_b: Snowflake) -> RepoResult<bool>;
}

/// User profile lookups
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<UserProfile>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset_and_limit() {
        let page = Page::new(1, 50);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 50);

        let page = Page::new(3, 20);
        assert_eq!(page.offset(), 40);
        assert_eq!(page.limit(), 20);
    }

    #[test]
    fn test_page_zero_is_treated_as_first() {
        let page = Page::new(0, 50);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_default_page() {
        assert_eq!(Page::default(), Page::new(1, 50));
    }
}
