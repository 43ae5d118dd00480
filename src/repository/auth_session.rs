//! Repository implementation for login sessions.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::auth_session::{AuthSession, NewAuthSession};
use crate::domain::types::AuthToken;
use crate::models::auth_session::{
    AuthSession as DbAuthSession, NewAuthSession as DbNewAuthSession,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AuthSessionReader, AuthSessionWriter, DieselRepository};

impl AuthSessionReader for DieselRepository {
    fn get_active_session(
        &self,
        token: &AuthToken,
        now: NaiveDateTime,
    ) -> RepositoryResult<Option<AuthSession>> {
        use crate::schema::auth_sessions;

        let mut conn = self.conn()?;
        let db_session = auth_sessions::table
            .filter(auth_sessions::token.eq(token.as_str()))
            .filter(auth_sessions::expires_at.gt(now))
            .first::<DbAuthSession>(&mut conn)
            .optional()?;

        db_session
            .map(|db_session| AuthSession::try_from(db_session).map_err(RepositoryError::from))
            .transpose()
    }
}

impl AuthSessionWriter for DieselRepository {
    fn create_auth_session(&self, new_session: &NewAuthSession) -> RepositoryResult<AuthSession> {
        use crate::schema::auth_sessions;

        let mut conn = self.conn()?;
        let db_new_session: DbNewAuthSession = new_session.into();

        let db_session = diesel::insert_into(auth_sessions::table)
            .values(&db_new_session)
            .get_result::<DbAuthSession>(&mut conn)?;

        AuthSession::try_from(db_session).map_err(RepositoryError::from)
    }

    fn delete_expired_sessions(&self, now: NaiveDateTime) -> RepositoryResult<usize> {
        use crate::schema::auth_sessions;

        let mut conn = self.conn()?;
        let deleted =
            diesel::delete(auth_sessions::table.filter(auth_sessions::expires_at.le(now)))
                .execute(&mut conn)?;

        Ok(deleted)
    }
}
