//! Mock repository implementations for isolating services in tests.

use chrono::NaiveDateTime;
use mockall::mock;

use crate::domain::auth_session::{AuthSession, NewAuthSession};
use crate::domain::round::{FinishedRound, LeaderboardEntry, NewRound, Round};
use crate::domain::types::{AuthToken, PlayerUuid, RoundId, UserId, Username};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    AuthSessionReader, AuthSessionWriter, RoundReader, RoundWriter, UserReader, UserWriter,
};

mock! {
    pub Repository {}

    impl UserReader for Repository {
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
        fn get_user_by_uuid(&self, uuid: &PlayerUuid) -> RepositoryResult<Option<User>>;
    }

    impl UserWriter for Repository {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn rename_user(&self, id: UserId, username: &Username) -> RepositoryResult<User>;
    }

    impl RoundReader for Repository {
        fn get_round_by_id(&self, id: RoundId) -> RepositoryResult<Option<Round>>;
        fn list_leaderboard(&self, limit: usize) -> RepositoryResult<Vec<LeaderboardEntry>>;
    }

    impl RoundWriter for Repository {
        fn create_round(&self, new_round: &NewRound) -> RepositoryResult<Round>;
        fn finish_round(&self, id: RoundId, finished: &FinishedRound) -> RepositoryResult<Round>;
    }

    impl AuthSessionReader for Repository {
        fn get_active_session(
            &self,
            token: &AuthToken,
            now: NaiveDateTime,
        ) -> RepositoryResult<Option<AuthSession>>;
    }

    impl AuthSessionWriter for Repository {
        fn create_auth_session(&self, new_session: &NewAuthSession) -> RepositoryResult<AuthSession>;
        fn delete_expired_sessions(&self, now: NaiveDateTime) -> RepositoryResult<usize>;
    }
}
