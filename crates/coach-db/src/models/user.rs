//! User database model

use sqlx::FromRow;

/// Database model for the users table (chat-relevant columns only)
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub display_name: String,
    pub role: String,
}
