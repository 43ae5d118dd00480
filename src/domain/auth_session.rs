use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::domain::types::{AuthSessionId, AuthToken, UserId};

/// Login session bound to the identity cookie.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AuthSession {
    pub id: AuthSessionId,
    #[serde(skip)]
    pub token: AuthToken,
    pub user_id: UserId,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewAuthSession {
    pub token: AuthToken,
    pub user_id: UserId,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl NewAuthSession {
    /// A session with a fresh token valid for `ttl` from `now`.
    #[must_use]
    pub fn issue(user_id: UserId, now: NaiveDateTime, ttl: Duration) -> Self {
        Self {
            token: AuthToken::generate(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }
}
