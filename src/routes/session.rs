use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, post, web};
use chrono::Utc;
use log::{error, info, warn};

use crate::dto::api::{ErrorResponse, SessionResponse, UsernameResponse};
use crate::forms::session::{SessionForm, UsernameForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{service_error_response, session_token};
use crate::services::session::{change_username, start_session};

/// An empty body asks for the defaults. Anything else must be a JSON
/// [`SessionForm`].
fn session_form(body: &[u8]) -> Result<SessionForm, serde_json::Error> {
    if body.trim_ascii().is_empty() {
        return Ok(SessionForm::default());
    }
    serde_json::from_slice(body)
}

/// Resumes or creates the caller's player and refreshes the identity cookie.
#[post("/session")]
pub async fn create_session(
    req: HttpRequest,
    identity: Option<Identity>,
    body: web::Bytes,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let form = match session_form(&body) {
        Ok(form) => form,
        Err(err) => {
            warn!("Rejected session body: {err}");
            return HttpResponse::BadRequest().json(ErrorResponse::new("Invalid request body"));
        }
    };
    let token = session_token(identity.as_ref());
    let now = Utc::now().naive_utc();

    let started = match start_session(
        repo.get_ref(),
        token.as_ref(),
        form,
        now,
        server_config.session_ttl(),
    ) {
        Ok(started) => started,
        Err(err) => return service_error_response(&err),
    };

    if let Some(token) = started.issued_token
        && let Err(err) = Identity::login(&req.extensions(), token.into_inner())
    {
        error!("Failed to store session cookie: {err}");
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::new("Failed to create session"));
    }

    info!(
        "Session for {} ({}), new: {}",
        started.user.username, started.user.uuid, started.is_new_user
    );
    HttpResponse::Ok().json(SessionResponse::new(&started.user, started.is_new_user))
}

#[post("/session/username")]
pub async fn update_username(
    identity: Option<Identity>,
    form: Option<web::Json<UsernameForm>>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Some(token) = session_token(identity.as_ref()) else {
        return HttpResponse::Unauthorized().json(ErrorResponse::new("Unauthorized"));
    };
    let Some(form) = form else {
        return HttpResponse::BadRequest().json(ErrorResponse::new("username is required"));
    };

    match change_username(
        repo.get_ref(),
        Some(&token),
        form.into_inner(),
        Utc::now().naive_utc(),
    ) {
        Ok(username) => HttpResponse::Ok().json(UsernameResponse {
            username: username.into_inner(),
        }),
        Err(err) => service_error_response(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_body_parsing() {
        assert_eq!(session_form(b"").unwrap(), SessionForm::default());
        assert_eq!(session_form(b" \n").unwrap(), SessionForm::default());
        assert_eq!(
            session_form(br#"{"username":"Ana"}"#).unwrap().username.as_deref(),
            Some("Ana")
        );
        assert!(session_form(b"{\"username\":").is_err());
        assert!(session_form(b"username=Ana").is_err());
        assert!(session_form(br#"{"username":42}"#).is_err());
    }
}
