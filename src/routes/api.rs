use actix_web::{HttpResponse, Responder, get, web};
use log::error;

use crate::dto::api::{ErrorResponse, HealthResponse, PlayerCount};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::ws::GameServer;
use crate::services::leaderboard::top_rounds;

#[get("/health")]
pub async fn health(server: web::Data<GameServer>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::ok(
        server.player_count(),
        server.uptime().as_secs(),
    ))
}

#[get("/players/count")]
pub async fn players_count(server: web::Data<GameServer>) -> impl Responder {
    HttpResponse::Ok().json(PlayerCount {
        count: server.player_count(),
    })
}

#[get("/leaderboard")]
pub async fn leaderboard(
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    match top_rounds(repo.get_ref(), server_config.rules.leaderboard_limit) {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(e) => {
            error!("Failed to get leaderboard: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to get leaderboard"))
        }
    }
}
