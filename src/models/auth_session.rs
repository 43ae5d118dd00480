//! Diesel models representing login sessions.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::auth_session::{
    AuthSession as DomainAuthSession, NewAuthSession as DomainNewAuthSession,
};
use crate::domain::types::{AuthSessionId, AuthToken, TypeConstraintError, UserId};
use crate::models::user::User;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = crate::schema::auth_sessions)]
pub struct AuthSession {
    pub id: i32,
    pub token: String,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::auth_sessions)]
pub struct NewAuthSession<'a> {
    pub token: &'a str,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl TryFrom<AuthSession> for DomainAuthSession {
    type Error = TypeConstraintError;

    fn try_from(session: AuthSession) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AuthSessionId::try_from(session.id)?,
            token: AuthToken::new(session.token)?,
            user_id: UserId::try_from(session.user_id)?,
            created_at: session.created_at,
            expires_at: session.expires_at,
        })
    }
}

impl<'a> From<&'a DomainNewAuthSession> for NewAuthSession<'a> {
    fn from(session: &'a DomainNewAuthSession) -> Self {
        Self {
            token: session.token.as_str(),
            user_id: session.user_id.get(),
            created_at: session.created_at,
            expires_at: session.expires_at,
        }
    }
}
