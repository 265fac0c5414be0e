//! # coach-service
//!
//! Application layer containing business logic, services, and DTOs.

pub mod dto;
pub mod services;

pub use dto::{
    ConversationResponse, MessageResponse, SenderUnreadResponse, UnreadCountsResponse,
};
pub use services::{ChatService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult};
