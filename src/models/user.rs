//! Diesel models representing player accounts.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{PlayerUuid, TypeConstraintError, UserId, Username};
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
/// Diesel model for [`crate::domain::user::User`].
pub struct User {
    pub id: i32,
    pub uuid: String,
    pub username: String,
    pub created_at: NaiveDateTime,
    pub total_earnings: i32,
    pub total_deliveries: i32,
    pub best_session_score: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
/// Insertable form of [`User`].
pub struct NewUser<'a> {
    pub uuid: &'a str,
    pub username: &'a str,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::try_from(user.id)?,
            uuid: PlayerUuid::new(user.uuid)?,
            username: Username::new(user.username)?,
            created_at: user.created_at,
            total_earnings: user.total_earnings,
            total_deliveries: user.total_deliveries,
            best_session_score: user.best_session_score,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            uuid: user.uuid.as_str(),
            username: user.username.as_str(),
        }
    }
}
