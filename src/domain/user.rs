use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{PlayerUuid, UserId, Username};

/// A registered player and their lifetime totals.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub uuid: PlayerUuid,
    pub username: Username,
    pub created_at: NaiveDateTime,
    pub total_earnings: i32,
    pub total_deliveries: i32,
    pub best_session_score: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub uuid: PlayerUuid,
    pub username: Username,
}

impl NewUser {
    #[must_use]
    pub fn new(uuid: PlayerUuid, username: Username) -> Self {
        Self { uuid, username }
    }

    /// A user with a freshly generated uuid.
    #[must_use]
    pub fn generate(username: Username) -> Self {
        Self::new(PlayerUuid::generate(), username)
    }
}
