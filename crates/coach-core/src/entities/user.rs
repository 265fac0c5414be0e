//! User profile as seen by the messaging layer
//!
//! Account management lives elsewhere; chat only needs identity, a display
//! name for notifications, and the trainer/client role.

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Role of a user within a coaching relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Trainer,
    Client,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trainer => "trainer",
            Self::Client => "client",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trainer" => Some(Self::Trainer),
            "client" => Some(Self::Client),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal user projection used for message envelopes and notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Snowflake,
    pub display_name: String,
    pub role: UserRole,
}
