//! Data transfer objects for API and gateway responses
//!
//! Snowflake IDs serialize as strings for JavaScript compatibility.

mod responses;

pub use responses::{
    ConversationResponse, MessageResponse, PartnerResponse, SenderUnreadResponse,
    UnreadCountsResponse,
};
