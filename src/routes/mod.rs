//! HTTP and WebSocket handlers.

use actix_identity::Identity;
use actix_web::{HttpResponse, web};
use log::error;

use crate::domain::types::AuthToken;
use crate::dto::api::ErrorResponse;
use crate::services::ServiceError;

pub mod api;
pub mod session;
pub mod ws;

/// Registers every route except the static client.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api::health).service(ws::socket).service(
        web::scope("/api")
            .service(api::players_count)
            .service(api::leaderboard)
            .service(session::create_session)
            .service(session::update_username),
    );
}

/// Token stored in the identity cookie. Malformed values are ignored.
pub fn session_token(identity: Option<&Identity>) -> Option<AuthToken> {
    let id = identity?.id().ok()?;
    AuthToken::new(id).ok()
}

/// Maps service failures onto JSON error responses.
pub fn service_error_response(err: &ServiceError) -> HttpResponse {
    match err {
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            HttpResponse::BadRequest().json(ErrorResponse::new(message.as_str()))
        }
        ServiceError::Unauthorized => {
            HttpResponse::Unauthorized().json(ErrorResponse::new("Unauthorized"))
        }
        ServiceError::Repository(e) => {
            error!("Storage failure: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse::new("Internal server error"))
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::repository::errors::RepositoryError;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::Form("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::TypeConstraint("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                ServiceError::Repository(RepositoryError::DatabaseError("locked".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(service_error_response(&err).status(), status, "{err}");
        }
    }
}
