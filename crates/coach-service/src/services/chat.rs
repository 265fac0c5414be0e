//! Chat service
//!
//! Orchestrates message storage, read-state transitions, and the derived
//! conversation views. Relationship checks gate writes only; a user keeps
//! read access to history with a former trainer or client.

use coach_core::{Message, MessageKind, Page, Snowflake};
use tracing::{info, instrument};

use crate::dto::{ConversationResponse, MessageResponse, UnreadCountsResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Maximum page size for history and search queries
const MAX_PAGE_SIZE: u32 = 100;
/// Maximum number of conversations returned at once
const MAX_CONVERSATION_LIMIT: u32 = 50;
/// Search query length bounds (code points)
const MAX_QUERY_CHARS: usize = 100;

/// Chat service
pub struct ChatService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChatService<'a> {
    /// Create a new ChatService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store a new message after validating content and relationship
    #[instrument(skip(self, body, attachments))]
    pub async fn send_message(
        &self,
        sender_id: Snowflake,
        receiver_id: Snowflake,
        kind: MessageKind,
        body: String,
        attachments: Vec<String>,
    ) -> ServiceResult<Message> {
        // Content rules fail fast, before any repository round trip
        Message::validate(sender_id, receiver_id, kind, &body, &attachments)?;

        if self
            .ctx
            .user_repo()
            .find_by_id(receiver_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("User", receiver_id.to_string()));
        }

        if !self
            .ctx
            .relationship_repo()
            .is_linked(sender_id, receiver_id)
            .await?
        {
            return Err(coach_core::DomainError::ChatNotAllowed.into());
        }

        let message = Message::new(
            self.ctx.generate_id(),
            sender_id,
            receiver_id,
            kind,
            body,
            attachments,
        )?;

        self.ctx.message_repo().append(&message).await?;

        info!(
            message_id = %message.id,
            sender_id = %sender_id,
            receiver_id = %receiver_id,
            kind = %message.kind,
            "message stored"
        );

        Ok(message)
    }

    /// Page through the conversation with a partner, newest first
    #[instrument(skip(self))]
    pub async fn conversation_history(
        &self,
        user_id: Snowflake,
        partner_id: Snowflake,
        page: u32,
        page_size: u32,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let page = Page::new(page.max(1), page_size.clamp(1, MAX_PAGE_SIZE));

        let messages = self
            .ctx
            .message_repo()
            .list_conversation(user_id, partner_id, page)
            .await?;

        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    /// Mark every unread message from `partner_id` to `reader_id` as read.
    /// Returns how many messages changed state; already-read messages are
    /// left untouched, so repeated calls return 0.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        reader_id: Snowflake,
        partner_id: Snowflake,
    ) -> ServiceResult<u64> {
        let count = self
            .ctx
            .message_repo()
            .mark_read(partner_id, reader_id)
            .await?;

        if count > 0 {
            info!(
                reader_id = %reader_id,
                partner_id = %partner_id,
                count,
                "messages marked read"
            );
        }

        Ok(count)
    }

    /// Unread badge data: total plus per-sender breakdown
    #[instrument(skip(self))]
    pub async fn unread_counts(&self, user_id: Snowflake) -> ServiceResult<UnreadCountsResponse> {
        let total = self.ctx.message_repo().unread_count_for(user_id).await?;
        let by_sender = self.ctx.message_repo().unread_by_sender(user_id).await?;

        Ok(UnreadCountsResponse {
            total,
            by_sender: by_sender.into_iter().map(Into::into).collect(),
        })
    }

    /// A user's conversations ordered by most recent activity
    #[instrument(skip(self))]
    pub async fn recent_conversations(
        &self,
        user_id: Snowflake,
        limit: u32,
    ) -> ServiceResult<Vec<ConversationResponse>> {
        let limit = limit.clamp(1, MAX_CONVERSATION_LIMIT);

        let summaries = self
            .ctx
            .message_repo()
            .recent_conversations(user_id, limit)
            .await?;

        Ok(summaries
            .into_iter()
            .map(|s| ConversationResponse::from_summary(s, user_id))
            .collect())
    }

    /// Case-insensitive substring search within one conversation
    #[instrument(skip(self, query))]
    pub async fn search_conversation(
        &self,
        user_id: Snowflake,
        partner_id: Snowflake,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let query_chars = query.chars().count();
        if query_chars == 0 || query_chars > MAX_QUERY_CHARS {
            return Err(ServiceError::validation(format!(
                "search query must be 1-{MAX_QUERY_CHARS} characters"
            )));
        }

        let page = Page::new(page.max(1), page_size.clamp(1, MAX_PAGE_SIZE));

        let messages = self
            .ctx
            .message_repo()
            .search(user_id, partner_id, query, page)
            .await?;

        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    /// Permanently delete a message; only its sender may do so
    #[instrument(skip(self))]
    pub async fn delete_message(
        &self,
        user_id: Snowflake,
        message_id: Snowflake,
    ) -> ServiceResult<()> {
        let message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or(coach_core::DomainError::MessageNotFound(message_id))?;

        if message.sender_id != user_id {
            return Err(coach_core::DomainError::NotMessageSender.into());
        }

        self.ctx.message_repo().delete(message_id).await?;

        info!(message_id = %message_id, user_id = %user_id, "message deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coach_common::JwtService;
    use coach_core::{
        ConversationSummary, DomainError, MessageRepository, RelationshipRepository, RepoResult,
        SenderUnread, SnowflakeGenerator, UserProfile, UserRepository, UserRole,
    };
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct InMemoryMessages {
        messages: Mutex<Vec<Message>>,
    }

    impl InMemoryMessages {
        fn new() -> Self {
            Self {
                messages: Mutex::new(Vec::new()),
            }
        }

        fn pair_filter(a: Snowflake, b: Snowflake) -> impl Fn(&&Message) -> bool {
            move |m| {
                (m.sender_id == a && m.receiver_id == b)
                    || (m.sender_id == b && m.receiver_id == a)
            }
        }

        fn sorted_desc(mut messages: Vec<Message>) -> Vec<Message> {
            messages.sort_by(|x, y| {
                y.created_at
                    .cmp(&x.created_at)
                    .then_with(|| y.id.cmp(&x.id))
            });
            messages
        }

        fn paginate(messages: Vec<Message>, page: Page) -> Vec<Message> {
            messages
                .into_iter()
                .skip(usize::try_from(page.offset()).unwrap())
                .take(usize::try_from(page.limit()).unwrap())
                .collect()
        }
    }

    #[async_trait]
    impl MessageRepository for InMemoryMessages {
        async fn append(&self, message: &Message) -> RepoResult<()> {
            self.messages.lock().push(message.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
            Ok(self.messages.lock().iter().find(|m| m.id == id).cloned())
        }

        async fn list_conversation(
            &self,
            user_a: Snowflake,
            user_b: Snowflake,
            page: Page,
        ) -> RepoResult<Vec<Message>> {
            let matching: Vec<Message> = self
                .messages
                .lock()
                .iter()
                .filter(Self::pair_filter(user_a, user_b))
                .cloned()
                .collect();
            Ok(Self::paginate(Self::sorted_desc(matching), page))
        }

        async fn mark_read(&self, sender: Snowflake, receiver: Snowflake) -> RepoResult<u64> {
            let mut count = 0;
            for m in self.messages.lock().iter_mut() {
                if m.sender_id == sender && m.receiver_id == receiver && !m.is_read {
                    m.mark_read();
                    count += 1;
                }
            }
            Ok(count)
        }

        async fn unread_count_for(&self, receiver: Snowflake) -> RepoResult<i64> {
            Ok(self
                .messages
                .lock()
                .iter()
                .filter(|m| m.receiver_id == receiver && !m.is_read)
                .count() as i64)
        }

        async fn unread_by_sender(&self, receiver: Snowflake) -> RepoResult<Vec<SenderUnread>> {
            let mut counts: HashMap<Snowflake, i64> = HashMap::new();
            for m in self.messages.lock().iter() {
                if m.receiver_id == receiver && !m.is_read {
                    *counts.entry(m.sender_id).or_default() += 1;
                }
            }
            let mut result: Vec<SenderUnread> = counts
                .into_iter()
                .map(|(sender_id, count)| SenderUnread { sender_id, count })
                .collect();
            result.sort_by(|a, b| b.count.cmp(&a.count));
            Ok(result)
        }

        async fn search(
            &self,
            user_a: Snowflake,
            user_b: Snowflake,
            query: &str,
            page: Page,
        ) -> RepoResult<Vec<Message>> {
            let needle = query.to_lowercase();
            let matching: Vec<Message> = self
                .messages
                .lock()
                .iter()
                .filter(Self::pair_filter(user_a, user_b))
                .filter(|m| m.body.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            Ok(Self::paginate(Self::sorted_desc(matching), page))
        }

        async fn delete(&self, id: Snowflake) -> RepoResult<()> {
            let mut messages = self.messages.lock();
            let before = messages.len();
            messages.retain(|m| m.id != id);
            if messages.len() == before {
                return Err(DomainError::MessageNotFound(id));
            }
            Ok(())
        }

        async fn recent_conversations(
            &self,
            user_id: Snowflake,
            limit: u32,
        ) -> RepoResult<Vec<ConversationSummary>> {
            let messages = self.messages.lock();
            let mut latest: HashMap<Snowflake, Message> = HashMap::new();
            for m in messages.iter().filter(|m| m.involves(user_id)) {
                let partner = m.partner_of(user_id);
                let replace = latest.get(&partner).is_none_or(|cur| {
                    (m.created_at, m.id) > (cur.created_at, cur.id)
                });
                if replace {
                    latest.insert(partner, m.clone());
                }
            }

            let mut summaries: Vec<ConversationSummary> = latest
                .into_iter()
                .map(|(partner, last_message)| {
                    let unread_count = messages
                        .iter()
                        .filter(|m| {
                            m.sender_id == partner && m.receiver_id == user_id && !m.is_read
                        })
                        .count() as i64;
                    ConversationSummary {
                        partner: UserProfile {
                            id: partner,
                            display_name: format!("user-{partner}"),
                            role: UserRole::Client,
                        },
                        last_message,
                        unread_count,
                    }
                })
                .collect();
            summaries.sort_by(|a, b| {
                (b.last_message.created_at, b.last_message.id)
                    .cmp(&(a.last_message.created_at, a.last_message.id))
            });
            summaries.truncate(limit as usize);
            Ok(summaries)
        }
    }

    struct FakeRelationships {
        links: Vec<(Snowflake, Snowflake)>,
    }

    #[async_trait]
    impl RelationshipRepository for FakeRelationships {
        async fn is_linked(&self, user_a: Snowflake, user_b: Snowflake) -> RepoResult<bool> {
            Ok(self
                .links
                .iter()
                .any(|&(t, c)| (t == user_a && c == user_b) || (t == user_b && c == user_a)))
        }
    }

    struct FakeUsers {
        users: Vec<UserProfile>,
    }

    #[async_trait]
    impl UserRepository for FakeUsers {
        async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<UserProfile>> {
            Ok(self.users.iter().find(|u| u.id == id).cloned())
        }
    }

    const TRAINER: Snowflake = Snowflake::new(1);
    const CLIENT: Snowflake = Snowflake::new(2);
    const OTHER_CLIENT: Snowflake = Snowflake::new(3);
    const STRANGER: Snowflake = Snowflake::new(9);

    fn test_context() -> ServiceContext {
        let users = vec![
            UserProfile {
                id: TRAINER,
                display_name: "Alex".to_string(),
                role: UserRole::Trainer,
            },
            UserProfile {
                id: CLIENT,
                display_name: "Dana".to_string(),
                role: UserRole::Client,
            },
            UserProfile {
                id: OTHER_CLIENT,
                display_name: "Sam".to_string(),
                role: UserRole::Client,
            },
            UserProfile {
                id: STRANGER,
                display_name: "Riley".to_string(),
                role: UserRole::Client,
            },
        ];

        ServiceContextBuilder::new()
            .message_repo(Arc::new(InMemoryMessages::new()))
            .relationship_repo(Arc::new(FakeRelationships {
                links: vec![(TRAINER, CLIENT), (TRAINER, OTHER_CLIENT)],
            }))
            .user_repo(Arc::new(FakeUsers { users }))
            .jwt_service(Arc::new(JwtService::new("test-secret-key", 900)))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(0)))
            .build()
            .unwrap()
    }

    use super::super::context::ServiceContextBuilder;

    async fn send_text(
        service: &ChatService<'_>,
        from: Snowflake,
        to: Snowflake,
        body: &str,
    ) -> ServiceResult<Message> {
        service
            .send_message(from, to, MessageKind::Text, body.to_string(), vec![])
            .await
    }

    #[tokio::test]
    async fn test_send_message_between_linked_users() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        let msg = send_text(&service, TRAINER, CLIENT, "great session today")
            .await
            .unwrap();

        assert_eq!(msg.sender_id, TRAINER);
        assert_eq!(msg.receiver_id, CLIENT);
        assert!(!msg.is_read);

        let stored = ctx.message_repo().find_by_id(msg.id).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_send_message_requires_relationship() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        let err = send_text(&service, TRAINER, STRANGER, "hello")
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "CHAT_NOT_ALLOWED");
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_send_message_to_unknown_user() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        let err = send_text(&service, TRAINER, Snowflake::new(999), "hello")
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_send_message_to_self_rejected() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        let err = send_text(&service, TRAINER, TRAINER, "note to self")
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "SELF_ADDRESSED_MESSAGE");
    }

    #[tokio::test]
    async fn test_send_message_content_rules() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        let err = send_text(&service, TRAINER, CLIENT, "").await.unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_BODY");

        let err = service
            .send_message(TRAINER, CLIENT, MessageKind::Image, String::new(), vec![])
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_ATTACHMENTS");

        let msg = service
            .send_message(
                TRAINER,
                CLIENT,
                MessageKind::Image,
                String::new(),
                vec!["https://cdn.example.com/form-check.mp4".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(msg.attachments.len(), 1);
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        for i in 0..5 {
            send_text(&service, TRAINER, CLIENT, &format!("message {i}"))
                .await
                .unwrap();
        }

        let page = service
            .conversation_history(CLIENT, TRAINER, 1, 3)
            .await
            .unwrap();

        assert_eq!(page.len(), 3);
        assert_eq!(page[0].message, "message 4");
        assert_eq!(page[1].message, "message 3");

        let page2 = service
            .conversation_history(CLIENT, TRAINER, 2, 3)
            .await
            .unwrap();
        assert_eq!(page2.len(), 2);
        assert_eq!(page2[1].message, "message 0");
    }

    #[tokio::test]
    async fn test_history_excludes_other_conversations() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        send_text(&service, TRAINER, CLIENT, "for dana").await.unwrap();
        send_text(&service, TRAINER, OTHER_CLIENT, "for sam").await.unwrap();

        let history = service
            .conversation_history(TRAINER, CLIENT, 1, 50)
            .await
            .unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message, "for dana");
    }

    #[tokio::test]
    async fn test_mark_read_counts_and_idempotency() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        send_text(&service, TRAINER, CLIENT, "one").await.unwrap();
        send_text(&service, TRAINER, CLIENT, "two").await.unwrap();
        // A message in the other direction must not be touched
        send_text(&service, CLIENT, TRAINER, "reply").await.unwrap();

        let count = service.mark_read(CLIENT, TRAINER).await.unwrap();
        assert_eq!(count, 2);

        // Second pass finds nothing unread
        let count = service.mark_read(CLIENT, TRAINER).await.unwrap();
        assert_eq!(count, 0);

        // The reply is still unread for the trainer
        let unread = service.unread_counts(TRAINER).await.unwrap();
        assert_eq!(unread.total, 1);
    }

    #[tokio::test]
    async fn test_unread_counts_by_sender() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        send_text(&service, CLIENT, TRAINER, "question").await.unwrap();
        send_text(&service, CLIENT, TRAINER, "another").await.unwrap();
        send_text(&service, OTHER_CLIENT, TRAINER, "hi coach").await.unwrap();

        let unread = service.unread_counts(TRAINER).await.unwrap();
        assert_eq!(unread.total, 3);
        assert_eq!(unread.by_sender.len(), 2);

        let from_client = unread
            .by_sender
            .iter()
            .find(|u| u.sender_id == CLIENT)
            .unwrap();
        assert_eq!(from_client.count, 2);
    }

    #[tokio::test]
    async fn test_delete_message_requires_sender() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        let msg = send_text(&service, TRAINER, CLIENT, "oops").await.unwrap();

        let err = service.delete_message(CLIENT, msg.id).await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_MESSAGE_SENDER");
        assert_eq!(err.status_code(), 403);

        service.delete_message(TRAINER, msg.id).await.unwrap();
        assert!(ctx
            .message_repo()
            .find_by_id(msg.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_message() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        let err = service
            .delete_message(TRAINER, Snowflake::new(12345))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "MESSAGE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        send_text(&service, TRAINER, CLIENT, "Leg day tomorrow").await.unwrap();
        send_text(&service, CLIENT, TRAINER, "rest day please").await.unwrap();
        send_text(&service, TRAINER, OTHER_CLIENT, "leg day for you too")
            .await
            .unwrap();

        let results = service
            .search_conversation(TRAINER, CLIENT, "LEG", 1, 50)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].message, "Leg day tomorrow");
    }

    #[tokio::test]
    async fn test_search_query_bounds() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        let err = service
            .search_conversation(TRAINER, CLIENT, "", 1, 50)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let long = "x".repeat(101);
        let err = service
            .search_conversation(TRAINER, CLIENT, &long, 1, 50)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_recent_conversations_ordering_and_unread() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        send_text(&service, TRAINER, CLIENT, "first").await.unwrap();
        send_text(&service, OTHER_CLIENT, TRAINER, "newer").await.unwrap();
        send_text(&service, CLIENT, TRAINER, "newest").await.unwrap();

        let conversations = service.recent_conversations(TRAINER, 10).await.unwrap();

        assert_eq!(conversations.len(), 2);
        // Most recent activity first
        assert_eq!(conversations[0].partner.id, CLIENT);
        assert_eq!(conversations[0].last_message.message, "newest");
        assert_eq!(conversations[0].unread_count, 1);
        assert!(!conversations[0].is_last_message_from_self);

        assert_eq!(conversations[1].partner.id, OTHER_CLIENT);
        assert_eq!(conversations[1].unread_count, 1);
    }

    #[tokio::test]
    async fn test_recent_conversations_respects_limit() {
        let ctx = test_context();
        let service = ChatService::new(&ctx);

        send_text(&service, TRAINER, CLIENT, "a").await.unwrap();
        send_text(&service, TRAINER, OTHER_CLIENT, "b").await.unwrap();

        let conversations = service.recent_conversations(TRAINER, 1).await.unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].partner.id, OTHER_CLIENT);
    }
}
