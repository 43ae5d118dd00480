//! Cookie-backed login sessions for the REST API.

use chrono::{Duration, NaiveDateTime};

use crate::domain::auth_session::{AuthSession, NewAuthSession};
use crate::domain::types::{AuthToken, Username};
use crate::domain::user::User;
use crate::forms::session::{PlayerRequest, SessionForm, UsernameForm};
use crate::repository::{AuthSessionReader, AuthSessionWriter, UserReader, UserWriter};
use crate::services::players::resolve_player;
use crate::services::{ServiceError, ServiceResult};

/// Result of [`start_session`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStart {
    pub user: User,
    pub is_new_user: bool,
    /// Set when the caller must store a new cookie.
    pub issued_token: Option<AuthToken>,
}

/// Returns the unexpired session behind `token`, if any.
pub fn authenticate<R>(
    repo: &R,
    token: Option<&AuthToken>,
    now: NaiveDateTime,
) -> ServiceResult<Option<AuthSession>>
where
    R: AuthSessionReader + ?Sized,
{
    match token {
        Some(token) => Ok(repo.get_active_session(token, now)?),
        None => Ok(None),
    }
}

/// Resumes or creates the player behind the request and makes sure they hold
/// a valid session token.
pub fn start_session<R>(
    repo: &R,
    token: Option<&AuthToken>,
    form: SessionForm,
    now: NaiveDateTime,
    ttl: Duration,
) -> ServiceResult<SessionStart>
where
    R: UserReader + UserWriter + AuthSessionReader + AuthSessionWriter + ?Sized,
{
    let request = PlayerRequest::try_from(form)?;

    match repo.delete_expired_sessions(now) {
        Ok(0) => {}
        Ok(purged) => log::debug!("Purged {purged} expired sessions"),
        Err(err) => log::warn!("Failed to purge expired sessions: {err}"),
    }

    let session = authenticate(repo, token, now)?;
    let resolved = resolve_player(repo, session.as_ref().map(|s| s.user_id), &request)?;

    // A session whose owner was not found falls through to a new token.
    let issued_token = match session {
        Some(session) if session.user_id == resolved.user.id => None,
        _ => {
            let created =
                repo.create_auth_session(&NewAuthSession::issue(resolved.user.id, now, ttl))?;
            Some(created.token)
        }
    };

    Ok(SessionStart {
        user: resolved.user,
        is_new_user: resolved.is_new_user,
        issued_token,
    })
}

/// Renames the player behind a valid session.
pub fn change_username<R>(
    repo: &R,
    token: Option<&AuthToken>,
    form: UsernameForm,
    now: NaiveDateTime,
) -> ServiceResult<Username>
where
    R: AuthSessionReader + UserWriter + ?Sized,
{
    let session = authenticate(repo, token, now)?.ok_or(ServiceError::Unauthorized)?;
    let username = Username::try_from(form)?;
    let user = repo.rename_user(session.user_id, &username)?;
    Ok(user.username)
}
