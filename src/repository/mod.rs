//! Persistence traits and their Diesel-backed implementation.

use chrono::NaiveDateTime;

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::auth_session::{AuthSession, NewAuthSession};
use crate::domain::round::{FinishedRound, LeaderboardEntry, NewRound, Round};
use crate::domain::types::{AuthToken, PlayerUuid, RoundId, UserId, Username};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::RepositoryResult;

pub mod auth_session;
pub mod errors;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod round;
pub mod user;

/// Repository backed by a pooled SQLite connection.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

pub trait UserReader {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_uuid(&self, uuid: &PlayerUuid) -> RepositoryResult<Option<User>>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    fn rename_user(&self, id: UserId, username: &Username) -> RepositoryResult<User>;
}

pub trait RoundReader {
    fn get_round_by_id(&self, id: RoundId) -> RepositoryResult<Option<Round>>;
    /// Finished rounds with earnings, best first.
    fn list_leaderboard(&self, limit: usize) -> RepositoryResult<Vec<LeaderboardEntry>>;
}

pub trait RoundWriter {
    fn create_round(&self, new_round: &NewRound) -> RepositoryResult<Round>;
    /// Closes an open round and folds its numbers into the owner's totals.
    fn finish_round(&self, id: RoundId, finished: &FinishedRound) -> RepositoryResult<Round>;
}

pub trait AuthSessionReader {
    /// Looks up a session by token, ignoring expired ones.
    fn get_active_session(
        &self,
        token: &AuthToken,
        now: NaiveDateTime,
    ) -> RepositoryResult<Option<AuthSession>>;
}

pub trait AuthSessionWriter {
    fn create_auth_session(&self, new_session: &NewAuthSession) -> RepositoryResult<AuthSession>;
    fn delete_expired_sessions(&self, now: NaiveDateTime) -> RepositoryResult<usize>;
}
