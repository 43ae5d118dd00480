//! Resolving who is behind a browser: session cookie, remembered uuid, or a
//! brand new player.

use chrono::NaiveDateTime;

use crate::domain::round::{NewRound, Round};
use crate::domain::types::{AuthToken, UserId};
use crate::domain::user::{NewUser, User};
use crate::forms::session::{PlayerRequest, SessionForm};
use crate::repository::{AuthSessionReader, RoundWriter, UserReader, UserWriter};
use crate::services::ServiceResult;
use crate::services::session::authenticate;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlayer {
    pub user: User,
    pub is_new_user: bool,
}

/// Finds the player by session owner, then by uuid, and creates one when
/// neither matches. A known player asking for a different name is renamed.
pub fn resolve_player<R>(
    repo: &R,
    session_user: Option<UserId>,
    request: &PlayerRequest,
) -> ServiceResult<ResolvedPlayer>
where
    R: UserReader + UserWriter + ?Sized,
{
    let mut existing = match session_user {
        Some(user_id) => repo.get_user_by_id(user_id)?,
        None => None,
    };
    if existing.is_none()
        && let Some(uuid) = &request.uuid
    {
        existing = repo.get_user_by_uuid(uuid)?;
    }

    let Some(user) = existing else {
        let username = request.username.clone().unwrap_or_default();
        let user = repo.create_user(&NewUser::generate(username))?;
        log::info!("Created player {} ({})", user.username, user.uuid);
        return Ok(ResolvedPlayer {
            user,
            is_new_user: true,
        });
    };

    let user = match &request.username {
        Some(username) if *username != user.username => repo.rename_user(user.id, username)?,
        _ => user,
    };

    Ok(ResolvedPlayer {
        user,
        is_new_user: false,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedPlayer {
    pub user: User,
    pub is_new_user: bool,
    pub round: Round,
}

/// Everything the lobby needs before a socket can play: the resolved player
/// and a freshly opened round.
pub fn join_player<R>(
    repo: &R,
    token: Option<&AuthToken>,
    form: SessionForm,
    now: NaiveDateTime,
) -> ServiceResult<JoinedPlayer>
where
    R: UserReader + UserWriter + RoundWriter + AuthSessionReader + ?Sized,
{
    let request = PlayerRequest::try_from(form)?;
    let session = authenticate(repo, token, now)?;
    let resolved = resolve_player(repo, session.map(|s| s.user_id), &request)?;
    let round = repo.create_round(&NewRound::new(resolved.user.id, now))?;

    Ok(JoinedPlayer {
        user: resolved.user,
        is_new_user: resolved.is_new_user,
        round,
    })
}
