//! User entity <-> model mapper

use coach_core::{Snowflake, UserProfile, UserRole};

use crate::models::UserModel;

/// Convert UserModel to UserProfile entity
impl From<UserModel> for UserProfile {
    fn from(model: UserModel) -> Self {
        UserProfile {
            id: Snowflake::new(model.id),
            display_name: model.display_name,
            // The role column carries a CHECK constraint on the known values
            role: UserRole::parse(&model.role).unwrap_or(UserRole::Client),
        }
    }
}
