//! Repository implementation for player accounts.

use diesel::prelude::*;

use crate::domain::types::{PlayerUuid, UserId, Username};
use crate::domain::user::{NewUser, User};
use crate::models::user::{NewUser as DbNewUser, User as DbUser};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, UserReader, UserWriter};

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::id.eq(id.get()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        db_user
            .map(|db_user| User::try_from(db_user).map_err(RepositoryError::from))
            .transpose()
    }

    fn get_user_by_uuid(&self, uuid: &PlayerUuid) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::uuid.eq(uuid.as_str()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        db_user
            .map(|db_user| User::try_from(db_user).map_err(RepositoryError::from))
            .transpose()
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_new_user: DbNewUser = new_user.into();

        let db_user = diesel::insert_into(users::table)
            .values(&db_new_user)
            .get_result::<DbUser>(&mut conn)?;

        User::try_from(db_user).map_err(RepositoryError::from)
    }

    fn rename_user(&self, id: UserId, username: &Username) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = diesel::update(users::table.filter(users::id.eq(id.get())))
            .set(users::username.eq(username.as_str()))
            .get_result::<DbUser>(&mut conn)?;

        User::try_from(db_user).map_err(RepositoryError::from)
    }
}
